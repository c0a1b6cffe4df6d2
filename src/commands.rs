// Command layer: one flow shared by the three programs. Each run checks for
// `--help`, validates flags, builds one request, sends it and prints the
// interpreted outcome. Output goes through the given writers so tests can
// capture it.

use crate::api::{send_json, ApiClient, ApiError, HttpTransport, Transport};
use crate::args::{FlagArgs, UsageError};
use crate::config::{ExitPolicy, Settings};
use crate::expense::{ExpenseCreateRequest, ExpenseDeleteRequest, ExpenseListQuery};
use crate::outcome::{interpret_create, interpret_delete, interpret_list, Outcome};
use crate::telemetry;
use chrono::{NaiveDate, Utc};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Program {
    CreateExpense,
    DeleteExpense,
    ListFriendExpenses,
}

impl Program {
    pub fn name(self) -> &'static str {
        match self {
            Program::CreateExpense => "create-expense",
            Program::DeleteExpense => "delete-expense",
            Program::ListFriendExpenses => "list-friend-expenses",
        }
    }

    /// Short usage line listing the required flags.
    pub fn usage(self) -> &'static str {
        match self {
            Program::CreateExpense => {
                "Usage:\n    create-expense --cost <amount> --currency_code <currency> --group_id <group_id> \
--user_id1 <id> --paid_share1 <amount> --owed_share1 <amount> --user_id2 <id> \
--paid_share2 <amount> --owed_share2 <amount> --description <text>\n"
            }
            Program::DeleteExpense => "Usage:\n    delete-expense --id <expense_id>\n",
            Program::ListFriendExpenses => {
                "Usage:\n    list-friend-expenses --friend_id <id> --limit <number>\n"
            }
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            Program::CreateExpense => CREATE_HELP,
            Program::DeleteExpense => DELETE_HELP,
            Program::ListFriendExpenses => LIST_HELP,
        }
    }
}

const CREATE_HELP: &str = "
Usage:
    create-expense [options]

Options:
    --cost <amount>                The total cost of the expense.
    --currency_code <currency>     The currency code (e.g., USD, CAD).
    --group_id <group_id>          The group ID (use 0 for personal expenses).
    --user_id1 <id>                The first user's ID (payer).
    --paid_share1 <amount>         The amount paid by the first user.
    --owed_share1 <amount>         The amount owed by the first user.
    --user_id2 <id>                The second user's ID (splitter).
    --paid_share2 <amount>         The amount paid by the second user.
    --owed_share2 <amount>         The amount owed by the second user.
    --description <text>           A description of the expense.
    --category_id <id>             The category ID (optional).
    --date <YYYY-MM-DD>            The date of the expense (optional, defaults to today).
    --help                         Show this help message.

Examples:
    create-expense --cost 22 --currency_code CAD --group_id 0 --user_id1 16073027 --paid_share1 22.00 --owed_share1 11.00 --user_id2 22088182 --paid_share2 0.00 --owed_share2 11.00 --description \"Test\" --category_id 18 --date \"2024-12-29\"
";

const DELETE_HELP: &str = "
Usage:
    delete-expense [options]

Options:
    --id <expense_id>      The ID of the expense to delete.
    --help                 Show this help message.

Examples:
    delete-expense --id 3503931874
";

const LIST_HELP: &str = "
Usage:
    list-friend-expenses [options]

Options:
    --friend_id <id>       The friend ID to fetch expenses for.
    --limit <number>       The maximum number of expenses to fetch.
    --help                 Show this help message.

Examples:
    list-friend-expenses --friend_id 22088182 --limit 25
";

/// How an invocation ended, before the exit policy is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Help,
    UsageError,
    Succeeded,
    /// The call went through but the API reported a failure.
    LogicalFailure,
    /// Transport error, non-success status or unreadable response.
    RequestFailed,
}

impl Status {
    pub fn exit_code(self, policy: ExitPolicy) -> ExitCode {
        match (self, policy) {
            (Status::Help | Status::Succeeded, _) => ExitCode::SUCCESS,
            (Status::UsageError, _) => ExitCode::FAILURE,
            (Status::LogicalFailure | Status::RequestFailed, ExitPolicy::Lenient) => {
                ExitCode::SUCCESS
            }
            (Status::LogicalFailure | Status::RequestFailed, ExitPolicy::Strict) => {
                ExitCode::FAILURE
            }
        }
    }
}

/// What a run needs besides its flags.
pub struct Context<'a> {
    pub api: &'a ApiClient,
    pub transport: &'a dyn Transport,
    /// Default for `--date`.
    pub today: NaiveDate,
}

/// A validated call to one endpoint.
#[derive(Debug, Clone, PartialEq)]
enum Call {
    Create(ExpenseCreateRequest),
    Delete(ExpenseDeleteRequest),
    List(ExpenseListQuery),
}

impl Call {
    fn from_args(program: Program, args: &FlagArgs, today: NaiveDate) -> Result<Self, UsageError> {
        Ok(match program {
            Program::CreateExpense => Call::Create(ExpenseCreateRequest::from_args(args, today)?),
            Program::DeleteExpense => Call::Delete(ExpenseDeleteRequest::from_args(args)?),
            Program::ListFriendExpenses => Call::List(ExpenseListQuery::from_args(args)?),
        })
    }

    /// Phrase used in error messages, e.g. "Error creating expense: ...".
    fn action(&self) -> String {
        match self {
            Call::Create(_) => "creating expense".into(),
            Call::Delete(d) => format!("deleting expense with ID {}", d.id),
            Call::List(_) => "fetching expenses".into(),
        }
    }

    fn perform(&self, api: &ApiClient, transport: &dyn Transport) -> Result<Outcome, ApiError> {
        match self {
            Call::Create(expense) => {
                let body = send_json(transport, api.create_expense(expense)?)?;
                Ok(interpret_create(body)?)
            }
            Call::Delete(expense) => {
                let body = send_json(transport, api.delete_expense(expense)?)?;
                Ok(interpret_delete(&expense.id, body)?)
            }
            Call::List(query) => {
                let body = send_json(transport, api.list_expenses(query)?)?;
                Ok(interpret_list(body))
            }
        }
    }
}

/// Run one program against `args`, writing results to `out` and errors to
/// `err`. Only failures to write are returned as errors.
pub fn run<W: Write, E: Write>(
    program: Program,
    args: &FlagArgs,
    ctx: &Context<'_>,
    out: &mut W,
    err: &mut E,
) -> io::Result<Status> {
    if args.help_requested() {
        write!(out, "{}", program.help())?;
        return Ok(Status::Help);
    }

    let call = match Call::from_args(program, args, ctx.today) {
        Ok(call) => call,
        Err(e) => {
            writeln!(
                err,
                "\nError: {e}.\n\n{}\nUse --help for more information.",
                program.usage()
            )?;
            return Ok(Status::UsageError);
        }
    };

    match call.perform(ctx.api, ctx.transport) {
        Ok(outcome) => {
            let failed = outcome.is_failure();
            info!(program = program.name(), failed, "call completed");
            if matches!(outcome, Outcome::CreateFailed(_)) {
                writeln!(err, "{outcome}")?;
            } else {
                writeln!(out, "{outcome}")?;
            }
            Ok(if failed {
                Status::LogicalFailure
            } else {
                Status::Succeeded
            })
        }
        Err(e) => {
            info!(program = program.name(), error = %e, "call failed");
            writeln!(err, "Error {}: {e}", call.action())?;
            Ok(Status::RequestFailed)
        }
    }
}

/// Process entry point shared by the binaries: sets up logging and
/// configuration from the environment, runs `program` on the process
/// arguments and maps the result through the configured exit policy.
pub fn main(program: Program) -> anyhow::Result<ExitCode> {
    telemetry::init();
    let settings = Settings::from_env();
    let api = ApiClient::from_settings(&settings)?;
    let transport = HttpTransport::new(api.http_client().clone());
    let ctx = Context {
        api: &api,
        transport: &transport,
        today: Utc::now().date_naive(),
    };

    let status = run(
        program,
        &FlagArgs::from_env(),
        &ctx,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    )?;
    Ok(status.exit_code(settings.exit_policy))
}
