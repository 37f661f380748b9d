use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use prest_client::Renderer;

use crate::utils::{
    parse_aggregate, parse_equal, parse_join, parse_operator, parse_range, AggregateArg,
    EqualFilter, JoinArg, OperatorFilter, RangeFilter,
};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Read connection options from a TOML file instead of the environment
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Set proxy
    #[arg(required = false, long, short = 'P', global = true)]
    pub proxy: Option<String>,

    /// Set user agent
    #[arg(required = false, long, short = 'A', global = true)]
    pub user_agent: Option<String>,

    /// Request timeout in seconds
    #[arg(required = false, long, global = true)]
    pub timeout: Option<u64>,

    #[clap(subcommand)]
    pub command: Commands,
}

/// Options shared by every table command.
///
/// They are applied in a fixed order: paging, projection, flags, ordering,
/// grouping, filters, joins, then aggregates.
#[derive(clap::Args, Debug, Default)]
pub struct QueryArgs {
    /// Page number
    #[arg(long)]
    pub page: Option<u64>,

    /// Rows per page
    #[arg(long)]
    pub page_size: Option<u64>,

    /// Fields to return
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<String>,

    /// Count rows of a field, `*` for all rows
    #[arg(long)]
    pub count: Option<String>,

    /// Return distinct rows
    #[arg(long)]
    pub distinct: bool,

    /// Response format (json or xml)
    #[arg(long)]
    pub renderer: Option<Renderer>,

    /// Order by fields, prefix with `-` for descending
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub order: Vec<String>,

    /// Group by fields
    #[arg(long, value_delimiter = ',')]
    pub group_by: Vec<String>,

    /// Equality filter, `field=value`
    #[arg(long = "eq", value_parser = parse_equal)]
    pub equal: Vec<EqualFilter>,

    /// Operator filter, `field:op:value` (e.g. `price:$gt:10`)
    #[arg(long, value_parser = parse_operator)]
    pub filter: Vec<OperatorFilter>,

    /// Inclusive range filter, `field:start:end`; either bound may be empty
    #[arg(long, value_parser = parse_range)]
    pub range: Vec<RangeFilter>,

    /// Match rows where the field is null
    #[arg(long)]
    pub null: Vec<String>,

    /// Match rows where the field is not null
    #[arg(long)]
    pub not_null: Vec<String>,

    /// Join a table, `kind:table:local_field:op:foreign_field`
    #[arg(long, value_parser = parse_join)]
    pub join: Vec<JoinArg>,

    /// Aggregate a field, `function:field` (sum, avg, max, min, stddev, variance)
    #[arg(long = "agg", value_parser = parse_aggregate)]
    pub aggregate: Vec<AggregateArg>,

    /// Print the request instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List rows of a table, or the tables of a schema with `schema.`
    #[clap(name = "list", visible_alias = "ls")]
    List {
        /// Table identifier, `table` or `schema.table`
        table: String,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Show the structure of a table
    Show {
        /// Table identifier, `table` or `schema.table`
        table: String,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Insert one row
    Insert {
        /// Table identifier, `table` or `schema.table`
        table: String,

        /// Row as a JSON object, or `-` to read stdin
        #[arg(short, long, allow_hyphen_values = true)]
        data: String,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Insert several rows in one request
    #[clap(name = "batch-insert")]
    BatchInsert {
        /// Table identifier, `table` or `schema.table`
        table: String,

        /// Rows as a JSON array, or `-` to read stdin
        #[arg(short, long, allow_hyphen_values = true)]
        data: String,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Update the rows matched by the filters
    Update {
        /// Table identifier, `table` or `schema.table`
        table: String,

        /// Changes as a JSON object, or `-` to read stdin
        #[arg(short, long, allow_hyphen_values = true)]
        data: String,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Delete the rows matched by the filters
    #[clap(name = "delete", visible_alias = "rm")]
    Delete {
        /// Table identifier, `table` or `schema.table`
        table: String,

        #[command(flatten)]
        query: QueryArgs,
    },
}
