//! The operations that clients can request and their arguments.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    Error,
    database_id::{CategoryId, DatabaseId, TransactionId},
    transaction::TransactionType,
};

/// The body of a request to the API endpoint, `{"operation": "...", "variables": {...}}`.
///
/// The variables are only checked against the operation by
/// [OperationRequest::into_operation].
#[derive(Debug, Deserialize)]
pub struct OperationRequest {
    operation: String,
    #[serde(default)]
    variables: Value,
}

impl OperationRequest {
    /// Parse a request body.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the body is not valid JSON or does not
    /// name an operation.
    pub fn from_json(body: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(body)
            .map_err(|error| Error::Validation(format!("Invalid request body: {error}")))
    }

    /// Whether the operation may only be run by an authenticated user.
    ///
    /// Unknown operations do not require an identity, they are rejected by
    /// [OperationRequest::into_operation] instead.
    pub fn requires_identity(&self) -> bool {
        matches!(
            self.operation.as_str(),
            "me" | "categories"
                | "category"
                | "transactions"
                | "transaction"
                | "summary"
                | "createCategory"
                | "updateCategory"
                | "deleteCategory"
                | "createTransaction"
                | "updateTransaction"
                | "deleteTransaction"
        )
    }

    /// Check the variables against the named operation.
    ///
    /// `variables` may be omitted or `null` for operations without arguments.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the request names an unknown
    /// operation or if the variables do not match the operation.
    pub fn into_operation(self) -> Result<Operation, Error> {
        let variables = self.variables;

        let operation = match self.operation.as_str() {
            "me" => Operation::Me,
            "categories" => Operation::Categories,
            "category" => Operation::Category(parse_variables(variables)?),
            "transactions" => Operation::Transactions,
            "transaction" => Operation::Transaction(parse_variables(variables)?),
            "summary" => Operation::Summary,
            "signup" => Operation::Signup(parse_variables(variables)?),
            "login" => Operation::Login(parse_variables(variables)?),
            "createCategory" => Operation::CreateCategory(parse_variables(variables)?),
            "updateCategory" => Operation::UpdateCategory(parse_variables(variables)?),
            "deleteCategory" => Operation::DeleteCategory(parse_variables(variables)?),
            "createTransaction" => Operation::CreateTransaction(parse_variables(variables)?),
            "updateTransaction" => Operation::UpdateTransaction(parse_variables(variables)?),
            "deleteTransaction" => Operation::DeleteTransaction(parse_variables(variables)?),
            unknown => {
                return Err(Error::Validation(format!("Unknown operation \"{unknown}\"")));
            }
        };

        Ok(operation)
    }
}

/// The arguments for signing up a new user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SignupArgs {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// The arguments for logging in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginArgs {
    pub email: String,
    pub password: String,
}

/// The arguments of operations that address a single resource.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct IdArgs {
    pub id: DatabaseId,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateCategoryArgs {
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdateCategoryArgs {
    pub id: CategoryId,
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// The arguments for recording a transaction.
///
/// `amount` may be given as a JSON number or a string, `date` as "YYYY-MM-DD"
/// or an RFC 3339 date-time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionArgs {
    pub description: Option<String>,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub date: String,
    pub category_id: CategoryId,
}

/// The arguments for changing a transaction, omitted fields are left unchanged.
///
/// An explicit `"description": null` clears the description.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionArgs {
    pub id: TransactionId,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
    pub amount: Option<Decimal>,
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    pub date: Option<String>,
    pub category_id: Option<CategoryId>,
}

/// A single API operation along with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Me,
    Categories,
    Category(IdArgs),
    Transactions,
    Transaction(IdArgs),
    Summary,
    Signup(SignupArgs),
    Login(LoginArgs),
    CreateCategory(CreateCategoryArgs),
    UpdateCategory(UpdateCategoryArgs),
    DeleteCategory(IdArgs),
    CreateTransaction(CreateTransactionArgs),
    UpdateTransaction(UpdateTransactionArgs),
    DeleteTransaction(IdArgs),
}

impl Operation {
    /// The name of the operation as used in requests.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Me => "me",
            Operation::Categories => "categories",
            Operation::Category(_) => "category",
            Operation::Transactions => "transactions",
            Operation::Transaction(_) => "transaction",
            Operation::Summary => "summary",
            Operation::Signup(_) => "signup",
            Operation::Login(_) => "login",
            Operation::CreateCategory(_) => "createCategory",
            Operation::UpdateCategory(_) => "updateCategory",
            Operation::DeleteCategory(_) => "deleteCategory",
            Operation::CreateTransaction(_) => "createTransaction",
            Operation::UpdateTransaction(_) => "updateTransaction",
            Operation::DeleteTransaction(_) => "deleteTransaction",
        }
    }
}

fn parse_variables<T: for<'de> Deserialize<'de>>(variables: Value) -> Result<T, Error> {
    let variables = match variables {
        Value::Null => Value::Object(Default::default()),
        variables => variables,
    };

    serde_json::from_value(variables)
        .map_err(|error| Error::Validation(format!("Invalid variables: {error}")))
}

#[cfg(test)]
mod operation_tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use crate::{Error, transaction::TransactionType};

    use super::{
        CreateTransactionArgs, IdArgs, Operation, OperationRequest, UpdateTransactionArgs,
    };

    fn parse(body: &[u8]) -> Result<Operation, Error> {
        OperationRequest::from_json(body)?.into_operation()
    }

    #[test]
    fn parses_operation_without_variables() {
        let operation = parse(br#"{"operation": "me"}"#);

        assert_eq!(operation, Ok(Operation::Me));
    }

    #[test]
    fn ignores_variables_of_operation_without_arguments() {
        let operation = parse(br#"{"operation": "summary", "variables": {}}"#);

        assert_eq!(operation, Ok(Operation::Summary));
    }

    #[test]
    fn parses_id_argument() {
        let operation =
            parse(br#"{"operation": "deleteCategory", "variables": {"id": 3}}"#);

        assert_eq!(operation, Ok(Operation::DeleteCategory(IdArgs { id: 3 })));
    }

    #[test]
    fn parses_create_transaction() {
        let operation = parse(
            br#"{
                "operation": "createTransaction",
                "variables": {
                    "amount": 42.50,
                    "type": "expense",
                    "date": "2024-01-15",
                    "categoryId": 7
                }
            }"#,
        );

        assert_eq!(
            operation,
            Ok(Operation::CreateTransaction(CreateTransactionArgs {
                description: None,
                amount: Decimal::new(425, 1),
                transaction_type: TransactionType::Expense,
                date: "2024-01-15".to_owned(),
                category_id: 7,
            }))
        );
    }

    #[test]
    fn accepts_amount_as_string() {
        let operation = parse(
            br#"{"operation": "updateTransaction", "variables": {"id": 1, "amount": "0.10"}}"#,
        );

        assert_eq!(
            operation,
            Ok(Operation::UpdateTransaction(UpdateTransactionArgs {
                id: 1,
                description: None,
                amount: Some(Decimal::new(10, 2)),
                transaction_type: None,
                date: None,
                category_id: None,
            }))
        );
    }

    #[test]
    fn explicit_null_description_is_kept_apart_from_omitted() {
        let cleared =
            parse(br#"{"operation": "updateTransaction", "variables": {"id": 1, "description": null}}"#);
        let omitted = parse(br#"{"operation": "updateTransaction", "variables": {"id": 1}}"#);

        assert!(matches!(
            cleared,
            Ok(Operation::UpdateTransaction(UpdateTransactionArgs {
                description: Some(None),
                ..
            }))
        ));
        assert!(matches!(
            omitted,
            Ok(Operation::UpdateTransaction(UpdateTransactionArgs {
                description: None,
                ..
            }))
        ));
    }

    #[test]
    fn only_signup_and_login_are_public() {
        for (operation, requires_identity) in [
            ("signup", false),
            ("login", false),
            ("category", true),
            ("summary", true),
            ("dropTables", false),
        ] {
            let body = json!({"operation": operation}).to_string();
            let request = OperationRequest::from_json(body.as_bytes()).unwrap();

            assert_eq!(request.requires_identity(), requires_identity, "{operation}");
        }
    }

    #[test]
    fn unknown_operation_is_validation_error() {
        let operation = parse(br#"{"operation": "dropTables"}"#);

        assert!(matches!(operation, Err(Error::Validation(_))));
    }

    #[test]
    fn missing_required_variable_is_validation_error() {
        let operation = parse(
            br#"{"operation": "signup", "variables": {"email": "a@x.com", "name": "Ana"}}"#,
        );

        assert!(matches!(operation, Err(Error::Validation(_))));
    }

    #[test]
    fn invalid_transaction_type_is_validation_error() {
        let operation = parse(
            br#"{
                "operation": "createTransaction",
                "variables": {"amount": 1, "type": "refund", "date": "2024-01-15", "categoryId": 1}
            }"#,
        );

        assert!(matches!(operation, Err(Error::Validation(_))));
    }

    #[test]
    fn malformed_json_is_validation_error() {
        let operation = parse(b"{not json");

        assert!(matches!(operation, Err(Error::Validation(_))));
    }

    #[test]
    fn name_matches_request_name() {
        let operation = parse(br#"{"operation": "createCategory", "variables": {"name": "Food"}}"#)
            .unwrap();

        assert_eq!(operation.name(), "createCategory");
    }
}
