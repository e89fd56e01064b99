//! The request body shared by the create and update transaction endpoints.

use serde::Deserialize;
use time::{Date, macros::format_description};

use crate::{
    Error,
    category::CategoryId,
    transaction::{
        Amount, TransactionType,
        core::{NewTransaction, TransactionChanges},
    },
};

/// An amount as it may appear in a JSON body, either `"12.50"` or `12.5`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Text(String),
    Number(serde_json::Number),
}

impl RawAmount {
    fn parse(&self) -> Result<Amount, Error> {
        match self {
            RawAmount::Text(text) => text.parse(),
            RawAmount::Number(number) => number.to_string().parse(),
        }
    }
}

/// The JSON body for creating or updating a transaction.
///
/// Every field is optional at this level so that absent fields can be
/// reported as validation errors (create) or left unchanged (update).
/// A JSON `null` is treated the same as an absent field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionForm {
    pub description: Option<String>,
    pub amount: Option<RawAmount>,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub category_id: Option<CategoryId>,
}

impl TransactionForm {
    /// Validate the form as a new transaction, defaulting the date to `today`.
    ///
    /// # Errors
    /// Returns an [Error::MissingField] if description, amount, type or
    /// category_id is absent, or the matching validation error if a field is
    /// present but invalid.
    pub fn into_new_transaction(self, today: Date) -> Result<NewTransaction, Error> {
        let description = self
            .description
            .ok_or(Error::MissingField("description"))?;
        let amount = self.amount.ok_or(Error::MissingField("amount"))?;
        let type_ = self.type_.ok_or(Error::MissingField("type"))?;
        let category_id = self.category_id.ok_or(Error::MissingField("category_id"))?;

        Ok(NewTransaction {
            description: parse_description(&description)?,
            amount: amount.parse()?,
            date: match self.date {
                Some(date) => parse_date(&date)?,
                None => today,
            },
            type_: type_.parse()?,
            category_id,
        })
    }

    /// Validate the fields that are present as changes to a transaction.
    ///
    /// # Errors
    /// Returns the matching validation error for the first invalid field.
    pub fn into_changes(self) -> Result<TransactionChanges, Error> {
        Ok(TransactionChanges {
            description: self
                .description
                .as_deref()
                .map(parse_description)
                .transpose()?,
            amount: self.amount.as_ref().map(RawAmount::parse).transpose()?,
            date: self.date.as_deref().map(parse_date).transpose()?,
            type_: self
                .type_
                .as_deref()
                .map(str::parse::<TransactionType>)
                .transpose()?,
            category_id: self.category_id,
        })
    }
}

fn parse_description(description: &str) -> Result<String, Error> {
    let description = description.trim();

    if description.is_empty() {
        Err(Error::EmptyDescription)
    } else {
        Ok(description.to_owned())
    }
}

/// Parse an ISO 8601 calendar date, e.g. "2024-03-15".
fn parse_date(date: &str) -> Result<Date, Error> {
    Date::parse(date.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| Error::InvalidDate(date.to_owned()))
}
