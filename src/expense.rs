// Request values for the three expense endpoints, built from flags.

use crate::args::{FlagArgs, UsageError};
use chrono::NaiveDate;
use serde::Serialize;

pub const CREATE_REQUIRED: &[&str] = &[
    "--cost",
    "--currency_code",
    "--group_id",
    "--user_id1",
    "--paid_share1",
    "--owed_share1",
    "--user_id2",
    "--paid_share2",
    "--owed_share2",
    "--description",
];
pub const DELETE_REQUIRED: &[&str] = &["--id"];
pub const LIST_REQUIRED: &[&str] = &["--friend_id", "--limit"];

/// Only split mode the programs submit.
pub const CREATION_METHOD: &str = "equal";

/// One side of a two-party split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub user_id: String,
    pub paid_share: String,
    pub owed_share: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseCreateRequest {
    pub cost: String,
    pub currency_code: String,
    /// `0` means a personal expense outside any group.
    pub group_id: String,
    pub description: String,
    pub date: String,
    pub payer: Participant,
    pub splitter: Participant,
    pub category_id: Option<String>,
}

impl ExpenseCreateRequest {
    /// `today` fills in `--date` when it is not given.
    pub fn from_args(args: &FlagArgs, today: NaiveDate) -> Result<Self, UsageError> {
        let mut v = args.require(CREATE_REQUIRED)?.into_iter();
        let mut next = || v.next().unwrap_or_default();
        let (cost, currency_code, group_id) = (next(), next(), next());
        let payer = Participant {
            user_id: next(),
            paid_share: next(),
            owed_share: next(),
        };
        let splitter = Participant {
            user_id: next(),
            paid_share: next(),
            owed_share: next(),
        };
        let description = next();

        Ok(ExpenseCreateRequest {
            cost,
            currency_code,
            group_id,
            description,
            date: args
                .value("--date")
                .map(str::to_string)
                .unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
            payer,
            splitter,
            category_id: args.value("--category_id").map(str::to_string),
        })
    }

    /// The flat, indexed field layout the endpoint expects.
    pub fn form(&self) -> CreateExpenseForm<'_> {
        CreateExpenseForm {
            cost: &self.cost,
            currency_code: &self.currency_code,
            group_id: &self.group_id,
            description: &self.description,
            creation_method: CREATION_METHOD,
            date: &self.date,
            user0_id: &self.payer.user_id,
            user0_paid: &self.payer.paid_share,
            user0_owed: &self.payer.owed_share,
            user1_id: &self.splitter.user_id,
            user1_paid: &self.splitter.paid_share,
            user1_owed: &self.splitter.owed_share,
            category_id: self.category_id.as_deref(),
        }
    }
}

/// Form-url-encoded body of `create_expense`.
#[derive(Debug, Serialize)]
pub struct CreateExpenseForm<'a> {
    pub cost: &'a str,
    pub currency_code: &'a str,
    pub group_id: &'a str,
    pub description: &'a str,
    pub creation_method: &'a str,
    pub date: &'a str,
    #[serde(rename = "users__0__user_id")]
    pub user0_id: &'a str,
    #[serde(rename = "users__0__paid_share")]
    pub user0_paid: &'a str,
    #[serde(rename = "users__0__owed_share")]
    pub user0_owed: &'a str,
    #[serde(rename = "users__1__user_id")]
    pub user1_id: &'a str,
    #[serde(rename = "users__1__paid_share")]
    pub user1_paid: &'a str,
    #[serde(rename = "users__1__owed_share")]
    pub user1_owed: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseDeleteRequest {
    pub id: String,
}

impl ExpenseDeleteRequest {
    pub fn from_args(args: &FlagArgs) -> Result<Self, UsageError> {
        let mut v = args.require(DELETE_REQUIRED)?;
        Ok(ExpenseDeleteRequest {
            id: v.remove(0),
        })
    }
}

/// Query of `get_expenses`, scoped to one friend outside any group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseListQuery {
    visible: bool,
    order: &'static str,
    pub friend_id: String,
    pub limit: String,
    group_id: u8,
}

impl ExpenseListQuery {
    pub fn new(friend_id: impl Into<String>, limit: impl Into<String>) -> Self {
        ExpenseListQuery {
            visible: true,
            order: "date",
            friend_id: friend_id.into(),
            limit: limit.into(),
            group_id: 0,
        }
    }

    pub fn from_args(args: &FlagArgs) -> Result<Self, UsageError> {
        let mut v = args.require(LIST_REQUIRED)?.into_iter();
        let friend_id = v.next().unwrap_or_default();
        let limit = v.next().unwrap_or_default();
        Ok(Self::new(friend_id, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_args(extra: &[&str]) -> FlagArgs {
        let mut tokens = vec![
            "--cost", "22", "--currency_code", "CAD", "--group_id", "0",
            "--user_id1", "16073027", "--paid_share1", "22.00", "--owed_share1", "11.00",
            "--user_id2", "22088182", "--paid_share2", "0.00", "--owed_share2", "11.00",
            "--description", "Test",
        ];
        tokens.extend_from_slice(extra);
        FlagArgs::new(tokens)
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 29).unwrap()
    }

    #[test]
    fn create_maps_flags_to_participants() {
        let req = ExpenseCreateRequest::from_args(&sample_args(&[]), day()).unwrap();
        assert_eq!(req.cost, "22");
        assert_eq!(req.currency_code, "CAD");
        assert_eq!(req.group_id, "0");
        assert_eq!(req.description, "Test");
        assert_eq!(
            req.payer,
            Participant {
                user_id: "16073027".into(),
                paid_share: "22.00".into(),
                owed_share: "11.00".into(),
            }
        );
        assert_eq!(req.splitter.user_id, "22088182");
        assert_eq!(req.splitter.paid_share, "0.00");
        assert_eq!(req.date, "2024-12-29");
        assert_eq!(req.category_id, None);
    }

    #[test]
    fn create_optional_flags() {
        let args = sample_args(&["--category_id", "18", "--date", "2025-01-02"]);
        let req = ExpenseCreateRequest::from_args(&args, day()).unwrap();
        assert_eq!(req.category_id.as_deref(), Some("18"));
        assert_eq!(req.date, "2025-01-02");
        assert_eq!(req.form().category_id, Some("18"));
    }

    #[test]
    fn create_missing_flags() {
        let args = FlagArgs::new(["--cost", "22", "--description", "x"]);
        let err = ExpenseCreateRequest::from_args(&args, day()).unwrap_err();
        assert_eq!(err.missing.len(), CREATE_REQUIRED.len() - 2);
        assert!(!err.missing.contains(&"--cost".to_string()));
    }

    #[test]
    fn delete_and_list_from_args() {
        let del = ExpenseDeleteRequest::from_args(&FlagArgs::new(["--id", "3503931874"])).unwrap();
        assert_eq!(del.id, "3503931874");
        assert!(ExpenseDeleteRequest::from_args(&FlagArgs::new(["--id"])).is_err());

        let q = ExpenseListQuery::from_args(&FlagArgs::new(["--limit", "25", "--friend_id", "22088182"]))
            .unwrap();
        assert_eq!(q, ExpenseListQuery::new("22088182", "25"));
        assert!(ExpenseListQuery::from_args(&FlagArgs::new(["--limit", "25"])).is_err());
    }
}
