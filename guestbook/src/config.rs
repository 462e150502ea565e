//! Process configuration
//!
//! Everything is read from command line flags with environment variable
//! fallbacks, so the same [`Settings`] work for a container (env only), a
//! Lambda function (env only) and a developer shell.

use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::{env, net::SocketAddr, path::PathBuf};

const UNAVAILABLE: &str = "Unavailable";

/// Settings shared by the `guestbook` server and the Lambda `bootstrap` binary
#[derive(Parser, Debug, Clone)]
#[command(name = "guestbook", version, about = "Guestbook demo application")]
pub struct Settings {
    /// DynamoDB table holding guestbook entries
    #[arg(long, env = "TABLE_NAME", default_value = "guestbook")]
    pub table_name: String,

    /// Storage backend for entries
    #[arg(long, env = "GUESTBOOK_STORE", value_enum, default_value_t = StoreKind::Dynamodb)]
    pub store: StoreKind,

    /// Override the DynamoDB endpoint, e.g. for DynamoDB Local
    #[arg(long, env = "DYNAMODB_ENDPOINT")]
    pub dynamodb_endpoint: Option<String>,

    /// File on the mounted volume that receives sequential ids
    #[arg(long, env = "VOLUME_PATH", default_value = "/data/ids.txt")]
    pub volume_path: PathBuf,

    /// Address the standalone server listens on
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// `tracing` filter directives
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_filter: String,
}

impl Settings {
    /// Reads settings from the process arguments and environment, exiting
    /// with a usage message when they don't parse.
    pub fn load() -> Self {
        Self::parse()
    }
}

/// Which [`GuestbookStore`](crate::store::GuestbookStore) backs the application
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Amazon DynamoDB
    Dynamodb,
    /// Process memory, lost on restart
    Memory,
}

/// Environment derived metadata shown on every page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Kubernetes node the pod is scheduled on
    pub node_name: String,
    /// Pod name, or host name outside Kubernetes
    pub pod_name: String,
    /// AWS region
    pub region: String,
}

impl Diagnostics {
    /// Resolves diagnostics from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolves diagnostics through `lookup`, taking the first non-blank value
    /// of each variable chain and `Unavailable` when none is set.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(key))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
                .unwrap_or_else(|| UNAVAILABLE.to_string())
        };
        Diagnostics {
            node_name: first(&["NODE_NAME"]),
            pod_name: first(&["POD_NAME", "HOSTNAME"]),
            region: first(&["AWS_REGION", "AWS_DEFAULT_REGION"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Diagnostics, Settings, StoreKind};
    use clap::Parser;
    use maplit::hashmap;
    use std::path::PathBuf;

    #[test]
    fn diagnostics_fall_back_through_variable_chains() {
        let vars = hashmap! {
            "HOSTNAME" => "guestbook-7d9f",
            "AWS_DEFAULT_REGION" => "eu-west-1",
        };
        let diagnostics = Diagnostics::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(
            diagnostics,
            Diagnostics {
                node_name: "Unavailable".into(),
                pod_name: "guestbook-7d9f".into(),
                region: "eu-west-1".into(),
            }
        );
    }

    #[test]
    fn diagnostics_prefer_first_non_blank_value() {
        let vars = hashmap! {
            "NODE_NAME" => "ip-10-0-1-12",
            "POD_NAME" => "  ",
            "HOSTNAME" => "fallback-host",
            "AWS_REGION" => "us-east-2",
            "AWS_DEFAULT_REGION" => "us-west-2",
        };
        let diagnostics = Diagnostics::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(diagnostics.node_name, "ip-10-0-1-12");
        assert_eq!(diagnostics.pod_name, "fallback-host");
        assert_eq!(diagnostics.region, "us-east-2");
    }

    #[test]
    fn settings_parse_flags() {
        let settings = Settings::try_parse_from([
            "guestbook",
            "--table-name",
            "entries",
            "--store",
            "memory",
            "--volume-path",
            "/tmp/ids.txt",
            "--listen",
            "127.0.0.1:3000",
        ])
        .expect("failed to parse settings");
        assert_eq!(settings.table_name, "entries");
        assert_eq!(settings.store, StoreKind::Memory);
        assert_eq!(settings.volume_path, PathBuf::from("/tmp/ids.txt"));
        assert_eq!(settings.listen.port(), 3000);
    }
}
