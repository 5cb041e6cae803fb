//! Process-wide server configuration (spec §3, §6).
//!
//! [`Cli`] is the `clap` surface; [`ServerConfig`] is the immutable,
//! `Arc`-shared value the rest of the server reads from after startup.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::error::{Result, ServerError};

const MAX_THREADS: u32 = 100;
const MAX_BUFFERS: u32 = 100;

/// Request scheduling discipline (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum SchedPolicy {
    Fifo,
    Sff,
}

/// `server [-d basedir] [-p port] [-t threads] [-b buffers] [-s schedalg]`
#[derive(Debug, Parser)]
#[command(name = "webserver", about = "Concurrent HTTP/1.0 origin server")]
pub struct Cli {
    /// Document root directory
    #[arg(short = 'd', long = "dir", default_value = ".")]
    pub basedir: PathBuf,

    /// Listen port
    #[arg(short = 'p', long = "port", default_value_t = 10000)]
    pub port: u16,

    /// Worker thread count (1..=100)
    #[arg(short = 't', long = "threads", default_value_t = 1)]
    pub threads: u32,

    /// Bounded queue capacity (1..=100)
    #[arg(short = 'b', long = "buffers", default_value_t = 1)]
    pub buffers: u32,

    /// Scheduling algorithm
    #[arg(short = 's', long = "sched", value_enum, default_value_t = SchedPolicy::Fifo, ignore_case = true)]
    pub sched: SchedPolicy,
}

/// Immutable, process-wide configuration built from [`Cli`] (spec §3).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub basedir: PathBuf,
    pub port: u16,
    pub threads: u32,
    pub buffers: u32,
    pub sched: SchedPolicy,
}

impl ServerConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        if cli.threads == 0 || cli.threads > MAX_THREADS {
            return Err(ServerError::Configuration(format!(
                "thread count must be in 1..={MAX_THREADS}, got {}",
                cli.threads
            )));
        }
        if cli.buffers == 0 || cli.buffers > MAX_BUFFERS {
            return Err(ServerError::Configuration(format!(
                "buffer count must be in 1..={MAX_BUFFERS}, got {}",
                cli.buffers
            )));
        }

        Ok(ServerConfig {
            basedir: cli.basedir,
            port: cli.port,
            threads: cli.threads,
            buffers: cli.buffers,
            sched: cli.sched,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(threads: u32, buffers: u32) -> Cli {
        Cli {
            basedir: PathBuf::from("."),
            port: 10000,
            threads,
            buffers,
            sched: SchedPolicy::Fifo,
        }
    }

    #[test]
    fn accepts_boundary_values() {
        assert!(ServerConfig::from_cli(cli(1, 1)).is_ok());
        assert!(ServerConfig::from_cli(cli(MAX_THREADS, MAX_BUFFERS)).is_ok());
    }

    #[test]
    fn rejects_zero_threads() {
        assert!(ServerConfig::from_cli(cli(0, 1)).is_err());
    }

    #[test]
    fn rejects_too_many_buffers() {
        assert!(ServerConfig::from_cli(cli(1, MAX_BUFFERS + 1)).is_err());
    }
}
