use clap::{Parser, builder::BoolishValueParser};
use passrate_core::report::{DEFAULT_INSTITUTION, DEFAULT_REPORT_TITLE, ReportHeading};
use passrate_core::store::StoreEndpoint;
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;

const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:4030";
const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;
const DEFAULT_DB_NAMESPACE: &str = "passrate";
const DEFAULT_DB_NAME: &str = "results";

#[derive(Parser, Debug)]
#[command(name = "passrated", version, about = "Pass-percentage reporting daemon.")]
struct CliArgs {
    #[arg(long, env = "PASSRATE_HTTP_ADDR", default_value = DEFAULT_HTTP_ADDR)]
    http_addr: SocketAddr,

    #[arg(
        long,
        env = "PASSRATE_MAX_BODY_BYTES",
        default_value_t = DEFAULT_MAX_BODY_BYTES
    )]
    max_body_bytes: usize,

    #[arg(
        long,
        env = "PASSRATE_DB_IN_MEMORY",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    db_in_memory: bool,

    #[arg(long, env = "PASSRATE_DB_URI")]
    db_uri: Option<String>,

    #[arg(long, env = "PASSRATE_DB_USERNAME")]
    db_username: Option<String>,

    #[arg(long, env = "PASSRATE_DB_PASSWORD")]
    db_password: Option<String>,

    #[arg(long, env = "PASSRATE_DB_NAMESPACE", default_value = DEFAULT_DB_NAMESPACE)]
    db_namespace: String,

    #[arg(long, env = "PASSRATE_DB_NAME", default_value = DEFAULT_DB_NAME)]
    db_name: String,

    #[arg(long, env = "PASSRATE_INSTITUTION", default_value = DEFAULT_INSTITUTION)]
    institution: String,

    #[arg(long, env = "PASSRATE_REPORT_TITLE", default_value = DEFAULT_REPORT_TITLE)]
    report_title: String,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Clone)]
pub struct PassrateConfig {
    pub http_addr: SocketAddr,
    pub max_body_bytes: usize,
    pub db_in_memory: bool,
    pub db_uri: Option<String>,
    pub db_username: Option<String>,
    pub db_password: Option<String>,
    pub db_namespace: String,
    pub db_name: String,
    pub heading: ReportHeading,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl PassrateConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }

    /// Where the record store lives, in-memory unless a remote URI is set.
    pub fn store_endpoint(&self) -> StoreEndpoint {
        match (
            self.db_in_memory,
            self.db_uri.as_deref(),
            self.db_username.as_deref(),
            self.db_password.as_deref(),
        ) {
            (false, Some(uri), Some(username), Some(password)) => StoreEndpoint::remote(
                uri,
                username,
                password,
                self.db_namespace.as_str(),
                self.db_name.as_str(),
            ),
            _ => StoreEndpoint::in_memory(self.db_namespace.as_str(), self.db_name.as_str()),
        }
    }
}

fn non_blank(name: &'static str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::InvalidSetting { name, value })
    } else {
        Ok(value)
    }
}

impl TryFrom<CliArgs> for PassrateConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let db_uri = args.db_uri.filter(|value| !value.trim().is_empty());
        let db_username = args.db_username.filter(|value| !value.trim().is_empty());
        let db_password = args.db_password.filter(|value| !value.trim().is_empty());

        let db_in_memory = args.db_in_memory || db_uri.is_none();

        if !db_in_memory {
            if db_username.is_none() {
                return Err(ConfigError::MissingSetting("PASSRATE_DB_USERNAME"));
            }
            if db_password.is_none() {
                return Err(ConfigError::MissingSetting("PASSRATE_DB_PASSWORD"));
            }
        }

        if args.max_body_bytes == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "PASSRATE_MAX_BODY_BYTES",
                value: args.max_body_bytes.to_string(),
            });
        }

        let db_namespace = non_blank("PASSRATE_DB_NAMESPACE", args.db_namespace)?;
        let db_name = non_blank("PASSRATE_DB_NAME", args.db_name)?;
        let institution = non_blank("PASSRATE_INSTITUTION", args.institution)?;
        let report_title = non_blank("PASSRATE_REPORT_TITLE", args.report_title)?;

        Ok(Self {
            http_addr: args.http_addr,
            max_body_bytes: args.max_body_bytes,
            db_in_memory,
            db_uri,
            db_username,
            db_password,
            db_namespace,
            db_name,
            heading: ReportHeading::new(institution, report_title),
        })
    }
}
