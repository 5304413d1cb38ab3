use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[clap(name = "team accountability server")]
pub struct Cli {
    #[clap(long, env, default_value = "teamfit.sqlite")]
    pub sqlite_connection_string: String,
    #[clap(long, env, default_value = "8080")]
    pub port: u16,
    #[clap(long, env, default_value = "127.0.0.1")]
    pub bind_addr: String,
    #[arg(long, env, default_value = "http://localhost:3000")]
    pub cors_origin: String,
    /// Upper bound on a request, database wait included
    #[arg(long, env, default_value = "15")]
    pub request_timeout_secs: u64,

    /// HS256 key used to verify bearer tokens
    #[arg(long, env, hide_env_values = true)]
    pub jwt_secret: String,
    /// Required `iss` claim, unchecked when unset
    #[arg(long, env)]
    pub jwt_issuer: Option<String>,

    /// Secret the scheduler sends in X-Cron-Secret. Cron triggers are refused while unset.
    #[arg(long, env, hide_env_values = true)]
    pub cron_secret: Option<String>,

    #[arg(long, env, default_value = "24")]
    pub invite_code_ttl_hours: i64,

    /// Deletes the database before starting the main program for debug purposes
    #[arg(long, env, default_value = "false")]
    pub debug_delete_database: bool,
}

impl Cli {
    pub fn invite_code_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.invite_code_ttl_hours)
    }
}
