use flatconf::{Config, ConfigError, ValueParser};

#[derive(Debug, Default, Clone, Copy, PartialEq)]
enum LogFormat {
    #[default]
    Text,
    Json,
}

impl ValueParser for LogFormat {
    fn parse_config_value(raw: &str) -> Result<Self, flatconf::BoxError> {
        match raw {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'").into()),
        }
    }
}

flatconf::config_record! {
    #[derive(Debug, Default)]
    struct AppConfig {
        name: String,
        port: u16 = "listen_port",
        debug: bool = "optional",
        log_format: LogFormat = "optional",
        motd: String = "optional",
    }
}

fn main() -> Result<(), ConfigError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Values from dev.conf override default.conf; LISTEN_PORT overrides both.
    let config: AppConfig = Config::builder()
        .with_file("demos/conf/default.conf", true)
        .with_file("demos/conf/dev.conf", false)
        .with_env()
        .build()?;

    println!("App: {} (debug={})", config.name, config.debug);
    println!("Listening on port {} with {:?} logs", config.port, config.log_format);
    println!("MOTD: {}", config.motd);

    Ok(())
}
