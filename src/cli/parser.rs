use clap::{ArgAction, Parser, Subcommand};

/// Command-line interface definition for rCycleTime
/// Cycle time and break tracker for production-line controllers
#[derive(Parser)]
#[command(
    name = "rcycletime",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track WORK/BREAK mode, board cycle times and breaks of line controllers, per shift, using SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(global = true, short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Start the HTTP API used by the line controllers
    Serve {
        #[arg(long = "bind", help = "Address to bind (default from config)")]
        bind: Option<String>,

        #[arg(long = "port", short = 'p', help = "Port to listen on (default from config)")]
        port: Option<u16>,

        #[arg(
            long = "sweep-interval",
            help = "Seconds between retention passes, 0 disables the timer"
        )]
        sweep_interval: Option<u64>,
    },

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Add missing fields to the configuration file")]
        migrate: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print or manage the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Set the target cycle time of a department/model pair
    Target {
        #[arg(long = "department", short = 'd')]
        department: String,

        #[arg(long = "model", short = 'm')]
        model: String,

        #[arg(long = "seconds", short = 's', help = "Target cycle time in seconds")]
        seconds: i64,
    },

    /// Prune records outside the current and previous shift
    Sweep {
        #[arg(long = "reset", help = "Delete ALL cycle records and break sessions")]
        reset: bool,
    },

    /// Show the records of a device for the current and previous shift
    Records {
        #[arg(long = "device", short = 'd', help = "Device id (e.g. ESP01)")]
        device: String,

        #[arg(long = "json", help = "Print the raw graph data as JSON")]
        json: bool,
    },
}
