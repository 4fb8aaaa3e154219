use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use filedrop::{AccessControl, ServerConfig};
use http::HeaderName;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// filedrop - upload, download, list and delete files over HTTP
#[derive(Parser, Debug)]
#[command(name = "filedrop")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "FILEDROP_ADDRESS")]
    address: String,

    /// Directory to store files in
    #[arg(long, env = "FILEDROP_STORAGE")]
    storage: PathBuf,

    /// Directory to get UI resources (index.html, client/, third_party/) from
    #[arg(long, env = "FILEDROP_DATADIR")]
    datadir: Option<PathBuf>,

    /// Use Sandstorm ACLs from the permission header
    #[arg(long, env = "FILEDROP_SANDSTORM_ACLS")]
    sandstorm_acls: bool,

    /// Header carrying the comma-separated permission list
    #[arg(long, default_value = filedrop::http::DEFAULT_PERMISSION_HEADER)]
    permission_header: HeaderName,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        let access = if self.sandstorm_acls {
            AccessControl::Enabled {
                header: self.permission_header,
            }
        } else {
            AccessControl::Disabled
        };

        let config = ServerConfig::new(self.address, self.storage).with_access(access);
        match self.datadir {
            Some(datadir) => config.with_data_dir(datadir),
            None => config,
        }
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "filedrop=info,filedrop_http=info,filedrop_store=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging();

    if let Err(e) = filedrop::serve(args.into_config()).await {
        tracing::error!(error = %e, "filedrop exited");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_open_access_without_ui() {
        let args = Args::try_parse_from([
            "filedrop",
            "--address",
            "0.0.0.0:8080",
            "--storage",
            "/srv",
        ])
        .unwrap();
        let config = args.into_config();
        assert_eq!(config.address, "0.0.0.0:8080");
        assert_eq!(config.storage_root, PathBuf::from("/srv"));
        assert!(config.data_dir.is_none());
        assert!(!config.access.is_enabled());
    }

    #[test]
    fn sandstorm_acls_use_default_header() {
        let args = Args::try_parse_from([
            "filedrop",
            "--address",
            "127.0.0.1:0",
            "--storage",
            "/srv",
            "--sandstorm-acls",
            "--datadir",
            "/usr/share/filedrop",
        ])
        .unwrap();
        let config = args.into_config();
        assert_eq!(config.data_dir, Some(PathBuf::from("/usr/share/filedrop")));
        match config.access {
            AccessControl::Enabled { header } => assert_eq!(header, "x-sandstorm-permissions"),
            AccessControl::Disabled => panic!("expected access control"),
        }
    }

    #[test]
    fn custom_permission_header() {
        let args = Args::try_parse_from([
            "filedrop",
            "--address",
            "127.0.0.1:0",
            "--storage",
            "/srv",
            "--sandstorm-acls",
            "--permission-header",
            "X-Caps",
        ])
        .unwrap();
        match args.into_config().access {
            AccessControl::Enabled { header } => assert_eq!(header, "x-caps"),
            AccessControl::Disabled => panic!("expected access control"),
        }
    }

    #[test]
    fn address_and_storage_are_required() {
        assert!(Args::try_parse_from(["filedrop", "--storage", "/srv"]).is_err());
        assert!(Args::try_parse_from(["filedrop", "--address", "0.0.0.0:8080"]).is_err());
    }

    #[test]
    fn args_are_well_formed() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
