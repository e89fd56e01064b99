//! Filtered listing of transactions.

use rusqlite::{Connection, named_params};
use serde::Deserialize;

use crate::{
    Error,
    category::CategoryId,
    transaction::{
        Transaction,
        core::{SELECT_TRANSACTION, map_transaction_row},
    },
};

/// The optional filters for listing transactions.
///
/// Filters that are set are combined with AND, so an empty filter matches
/// every transaction.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionFilter {
    /// Only include transactions dated in this calendar year.
    pub year: Option<i64>,
    /// Only include transactions dated in this month (1-12) of any year.
    pub month: Option<i64>,
    /// Only include transactions in this category.
    pub category_id: Option<CategoryId>,
    /// Only include transactions whose description contains this text,
    /// ignoring case.
    pub search: Option<String>,
}

impl TransactionFilter {
    /// The lowercase search text, or `None` if there is nothing to search for.
    fn search_text(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|search| !search.is_empty())
            .map(str::to_lowercase)
    }
}

/// Get the transactions matching `filter`, newest first.
///
/// Transactions on the same date are ordered by ID, newest first, so the
/// order is stable between calls.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query fails or a row cannot be mapped.
pub fn query_transactions(
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let query = format!(
        "{SELECT_TRANSACTION} \
        WHERE (:year IS NULL OR CAST(strftime('%Y', date) AS INTEGER) = :year) \
        AND (:month IS NULL OR CAST(strftime('%m', date) AS INTEGER) = :month) \
        AND (:category_id IS NULL OR category_id = :category_id) \
        ORDER BY date DESC, \"transaction\".id DESC"
    );

    let transactions = connection
        .prepare(&query)?
        .query_map(
            named_params! {
                ":year": filter.year,
                ":month": filter.month,
                ":category_id": filter.category_id,
            },
            map_transaction_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;

    // SQLite's LOWER only folds ASCII, so the text search is done here.
    let transactions = match filter.search_text() {
        Some(search) => transactions
            .into_iter()
            .filter(|transaction| transaction.description.to_lowercase().contains(&search))
            .collect(),
        None => transactions,
    };

    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rusqlite::Connection;
    use time::{Date, macros::date};

    use crate::{
        category::{Category, CategoryName, create_category},
        db::initialize,
        transaction::{
            NewTransaction, TransactionId, TransactionType, create_transaction,
            query::{TransactionFilter, query_transactions},
        },
    };

    struct Fixture {
        connection: Connection,
        groceries: Category,
        salary: Category,
    }

    fn get_fixture() -> Fixture {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let groceries = create_category(CategoryName::new_unchecked("Groceries"), &connection)
            .expect("Could not create category");
        let salary = create_category(CategoryName::new_unchecked("Salary"), &connection)
            .expect("Could not create category");

        let rows = [
            ("Coffee beans", date!(2024 - 03 - 02), &groceries),
            ("March salary", date!(2024 - 03 - 28), &salary),
            ("ICED COFFEE", date!(2024 - 03 - 15), &groceries),
            ("Coffee filter", date!(2024 - 04 - 01), &groceries),
            ("Café com leite", date!(2023 - 03 - 10), &groceries),
            ("Bread", date!(2024 - 03 - 20), &groceries),
        ];
        for (description, date, category) in rows {
            insert(&connection, description, date, category);
        }

        Fixture {
            connection,
            groceries,
            salary,
        }
    }

    fn insert(connection: &Connection, description: &str, date: Date, category: &Category) {
        create_transaction(
            NewTransaction {
                description: description.to_owned(),
                amount: "1.00".parse().unwrap(),
                date,
                type_: TransactionType::Expense,
                category_id: category.id,
            },
            connection,
        )
        .expect("Could not create transaction");
    }

    fn descriptions(filter: &TransactionFilter, connection: &Connection) -> Vec<String> {
        query_transactions(filter, connection)
            .expect("Could not query transactions")
            .into_iter()
            .map(|transaction| transaction.description)
            .collect()
    }

    fn ids(filter: &TransactionFilter, connection: &Connection) -> HashSet<TransactionId> {
        query_transactions(filter, connection)
            .expect("Could not query transactions")
            .into_iter()
            .map(|transaction| transaction.id)
            .collect()
    }

    #[test]
    fn no_filter_returns_everything_newest_first() {
        let fixture = get_fixture();

        let got = descriptions(&TransactionFilter::default(), &fixture.connection);

        assert_eq!(
            got,
            vec![
                "Coffee filter",
                "March salary",
                "Bread",
                "ICED COFFEE",
                "Coffee beans",
                "Café com leite",
            ]
        );
    }

    #[test]
    fn same_date_is_ordered_by_newest_id() {
        let fixture = get_fixture();
        let date = date!(2030 - 01 - 01);
        insert(&fixture.connection, "first", date, &fixture.groceries);
        insert(&fixture.connection, "second", date, &fixture.groceries);

        let got = descriptions(&TransactionFilter::default(), &fixture.connection);

        assert_eq!(got[..2], ["second", "first"]);
    }

    #[test]
    fn filters_by_year_and_month() {
        let fixture = get_fixture();
        let filter = TransactionFilter {
            year: Some(2024),
            month: Some(3),
            ..Default::default()
        };

        let got = descriptions(&filter, &fixture.connection);

        assert_eq!(
            got,
            vec!["March salary", "Bread", "ICED COFFEE", "Coffee beans"]
        );
    }

    #[test]
    fn filters_by_month_across_years() {
        let fixture = get_fixture();
        let filter = TransactionFilter {
            month: Some(3),
            ..Default::default()
        };

        let got = descriptions(&filter, &fixture.connection);

        assert_eq!(got.len(), 5);
        assert!(!got.contains(&"Coffee filter".to_owned()));
    }

    #[test]
    fn filters_by_category() {
        let fixture = get_fixture();
        let filter = TransactionFilter {
            category_id: Some(fixture.salary.id),
            ..Default::default()
        };

        let got = descriptions(&filter, &fixture.connection);

        assert_eq!(got, vec!["March salary"]);
    }

    #[test]
    fn search_ignores_case() {
        let fixture = get_fixture();
        let filter = TransactionFilter {
            year: Some(2024),
            month: Some(3),
            search: Some("coffee".to_owned()),
            ..Default::default()
        };

        let got = descriptions(&filter, &fixture.connection);

        assert_eq!(got, vec!["ICED COFFEE", "Coffee beans"]);
    }

    #[test]
    fn search_folds_non_ascii_case() {
        let fixture = get_fixture();
        let filter = TransactionFilter {
            search: Some("CAFÉ".to_owned()),
            ..Default::default()
        };

        let got = descriptions(&filter, &fixture.connection);

        assert_eq!(got, vec!["Café com leite"]);
    }

    #[test]
    fn blank_search_is_ignored() {
        let fixture = get_fixture();
        let filter = TransactionFilter {
            search: Some("  ".to_owned()),
            ..Default::default()
        };

        assert_eq!(ids(&filter, &fixture.connection).len(), 6);
    }

    #[test]
    fn combined_filters_intersect_individual_filters() {
        let fixture = get_fixture();
        let year = TransactionFilter {
            year: Some(2024),
            ..Default::default()
        };
        let month = TransactionFilter {
            month: Some(3),
            ..Default::default()
        };
        let category = TransactionFilter {
            category_id: Some(fixture.groceries.id),
            ..Default::default()
        };
        let search = TransactionFilter {
            search: Some("coffee".to_owned()),
            ..Default::default()
        };
        let combined = TransactionFilter {
            year: Some(2024),
            month: Some(3),
            category_id: Some(fixture.groceries.id),
            search: Some("coffee".to_owned()),
        };

        let want = [year, month, category, search]
            .iter()
            .map(|filter| ids(filter, &fixture.connection))
            .reduce(|acc, ids| acc.intersection(&ids).copied().collect())
            .unwrap();
        let got = ids(&combined, &fixture.connection);

        assert_eq!(got, want);
        assert_eq!(got.len(), 2);
    }

    #[test]
    fn month_without_matches_returns_empty() {
        let fixture = get_fixture();
        let filter = TransactionFilter {
            month: Some(13),
            ..Default::default()
        };

        assert!(ids(&filter, &fixture.connection).is_empty());
    }
}
