use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use profile_rollup_api::{ProbeStrategy, WritePolicy};
use profile_rollup_core::{DateBasis, DocumentKind};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "profile-rollup",
    about = "Append profile records to daily aggregate documents in S3",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress all log output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Append one payload to today's segments and metadata documents
    Upload(UploadArgs),

    /// Print the object key of a daily document
    Key {
        /// Document kind
        #[arg(long)]
        kind: DocumentKind,

        /// Date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Clock used for "today"
        #[arg(long, value_enum, default_value_t = BasisArg::Utc)]
        basis: BasisArg,
    },

    /// Print the plugin registration manifest as JSON
    Manifest {
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Payload file, or `-` for stdin
    #[arg(long, short = 'p', conflicts_with = "expr")]
    pub payload: Option<PathBuf>,

    /// Inline payload JSON
    #[arg(long, short = 'e')]
    pub expr: Option<String>,

    /// Target bucket
    #[arg(long, env = "PROFILE_ROLLUP_BUCKET")]
    pub bucket: String,

    /// AWS access key id
    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub access_key_id: String,

    /// AWS secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_access_key: String,

    /// AWS region (falls back to the SDK provider chain)
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Endpoint override, e.g. a LocalStack or MinIO URL
    #[arg(long, env = "PROFILE_ROLLUP_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Key prefix inside the bucket
    #[arg(long)]
    pub prefix: Option<String>,

    /// Operation timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// How to detect an existing document
    #[arg(long, value_enum, default_value_t = ProbeArg::List)]
    pub probe: ProbeArg,

    /// Guard writes with ETag preconditions and retry on conflict
    #[arg(long)]
    pub conditional: bool,

    /// Read-merge-write cycles before giving up on a conflict
    #[arg(
        long,
        requires = "conditional",
        default_value_t = profile_rollup_api::flow::DEFAULT_MAX_ATTEMPTS
    )]
    pub max_attempts: u32,

    /// Clock used for "today"
    #[arg(long, value_enum, default_value_t = BasisArg::Utc)]
    pub basis: BasisArg,

    /// Write to the documents of this date instead of today (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

impl UploadArgs {
    pub fn write_policy(&self) -> WritePolicy {
        if self.conditional {
            WritePolicy::Conditional {
                max_attempts: self.max_attempts,
            }
        } else {
            WritePolicy::Overwrite
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BasisArg {
    Utc,
    Local,
}

impl From<BasisArg> for DateBasis {
    fn from(arg: BasisArg) -> Self {
        match arg {
            BasisArg::Utc => DateBasis::Utc,
            BasisArg::Local => DateBasis::Local,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProbeArg {
    List,
    Fetch,
}

impl From<ProbeArg> for ProbeStrategy {
    fn from(arg: ProbeArg) -> Self {
        match arg {
            ProbeArg::List => ProbeStrategy::List,
            ProbeArg::Fetch => ProbeStrategy::Fetch,
        }
    }
}
