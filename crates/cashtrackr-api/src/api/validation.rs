// Input validation for request bodies and path parameters
//
// Every field runs through a chain of rules. A chain keeps collecting errors after
// a failed rule unless it was started with `bail()`, so a missing amount reports
// "empty", "not numeric" and "not positive" together. Values are checked in their
// string form: a missing field or `null` is "", numbers use their JSON spelling.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use std::str::FromStr;
use std::sync::OnceLock;
use utoipa::ToSchema;

use crate::error::ApiError;

pub type JsonObject = Map<String, Value>;

/// Message for a body that is not valid JSON
pub const INVALID_JSON_MESSAGE: &str = "JSON no valido";

/// Where a validated value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Body,
    Params,
}

/// One failed rule, as returned in the `errors` array of a 400 response
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FieldError {
    /// Always "field"
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// The rejected value, omitted when the field was absent
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub value: Option<Value>,
    pub msg: String,
    pub path: String,
    pub location: Location,
}

impl FieldError {
    pub fn new(path: &str, location: Location, msg: &str, value: Option<Value>) -> Self {
        Self {
            kind: "field",
            value,
            msg: msg.to_string(),
            path: path.to_string(),
            location,
        }
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
            .unwrap_or_else(|_| unreachable!("email pattern is valid"))
    })
}

fn numeric_regex() -> &'static Regex {
    static NUMERIC: OnceLock<Regex> = OnceLock::new();
    NUMERIC.get_or_init(|| {
        Regex::new(r"^[+-]?([0-9]*[.])?[0-9]+$").unwrap_or_else(|_| unreachable!("numeric pattern is valid"))
    })
}

fn int_regex() -> &'static Regex {
    static INT: OnceLock<Regex> = OnceLock::new();
    INT.get_or_init(|| Regex::new(r"^[+-]?[0-9]+$").unwrap_or_else(|_| unreachable!("int pattern is valid")))
}

/// String form of a JSON value as the rules see it
fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Rule chain for a single field
pub struct FieldCheck {
    path: String,
    location: Location,
    raw: Option<Value>,
    text: String,
    bail: bool,
    halted: bool,
    errors: Vec<FieldError>,
}

impl FieldCheck {
    /// Check `path` in a JSON body
    pub fn body(body: &JsonObject, path: &str) -> Self {
        let raw = body.get(path).cloned();
        let text = value_text(raw.as_ref());
        Self::with(path, Location::Body, raw, text)
    }

    /// Check a path parameter
    pub fn param(path: &str, raw: &str) -> Self {
        Self::with(
            path,
            Location::Params,
            Some(Value::String(raw.to_string())),
            raw.to_string(),
        )
    }

    fn with(path: &str, location: Location, raw: Option<Value>, text: String) -> Self {
        Self {
            path: path.to_string(),
            location,
            raw,
            text,
            bail: false,
            halted: false,
            errors: Vec::new(),
        }
    }

    /// Stop at the first failed rule
    pub fn bail(mut self) -> Self {
        self.bail = true;
        self
    }

    fn rule(mut self, ok: bool, msg: &str) -> Self {
        if self.halted || ok {
            return self;
        }
        self.errors
            .push(FieldError::new(&self.path, self.location, msg, self.raw.clone()));
        if self.bail {
            self.halted = true;
        }
        self
    }

    pub fn not_empty(self, msg: &str) -> Self {
        let ok = !self.text.trim().is_empty();
        self.rule(ok, msg)
    }

    pub fn min_length(self, min: usize, msg: &str) -> Self {
        let ok = self.text.chars().count() >= min;
        self.rule(ok, msg)
    }

    pub fn max_length(self, max: usize, msg: &str) -> Self {
        let ok = self.text.chars().count() <= max;
        self.rule(ok, msg)
    }

    pub fn exact_length(self, len: usize, msg: &str) -> Self {
        let ok = self.text.chars().count() == len;
        self.rule(ok, msg)
    }

    pub fn is_email(self, msg: &str) -> Self {
        let ok = email_regex().is_match(&self.text);
        self.rule(ok, msg)
    }

    pub fn is_numeric(self, msg: &str) -> Self {
        let ok = numeric_regex().is_match(&self.text);
        self.rule(ok, msg)
    }

    pub fn is_int(self, msg: &str) -> Self {
        let ok = int_regex().is_match(&self.text);
        self.rule(ok, msg)
    }

    pub fn greater_than_zero(self, msg: &str) -> Self {
        let ok = self
            .text
            .trim()
            .parse::<f64>()
            .map(|n| n > 0.0)
            .unwrap_or(false);
        self.rule(ok, msg)
    }

    /// Append this field's errors to `errors`
    pub fn finish(self, errors: &mut Vec<FieldError>) {
        errors.extend(self.errors);
    }
}

/// Read a string field; absent or null becomes ""
pub fn text_field(body: &JsonObject, path: &str) -> String {
    value_text(body.get(path))
}

/// Read a numeric field that already passed `is_numeric`
pub fn decimal_field(body: &JsonObject, path: &str) -> Option<Decimal> {
    let text = value_text(body.get(path));
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Parse a JSON request body; an empty body counts as `{}`
pub fn parse_json_object(bytes: &[u8]) -> Result<JsonObject, ApiError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(JsonObject::new());
    }

    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        // Arrays and scalars carry no named fields
        Ok(_) => Ok(JsonObject::new()),
        Err(e) => {
            tracing::debug!("Rejected request body: {}", e);
            Err(ApiError::BadRequest(INVALID_JSON_MESSAGE.to_string()))
        }
    }
}

/// Validate a positive integer id path parameter.
///
/// Fails with exactly one error: `not_int_msg` when the value is not an integer,
/// `not_positive_msg` when it is zero or negative.
pub fn parse_id_param(
    raw: &str,
    path: &str,
    not_int_msg: &str,
    not_positive_msg: &str,
) -> Result<i64, ApiError> {
    let mut errors = Vec::new();
    FieldCheck::param(path, raw)
        .bail()
        .is_int(not_int_msg)
        .greater_than_zero(not_positive_msg)
        .finish(&mut errors);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    raw.trim().parse::<i64>().map_err(|_| {
        ApiError::Validation(vec![FieldError::new(
            path,
            Location::Params,
            not_int_msg,
            Some(Value::String(raw.to_string())),
        )])
    })
}

/// A request body type with its own rule set
pub trait ValidatedInput: Sized {
    fn validate(body: &JsonObject) -> Result<Self, Vec<FieldError>>;
}

/// Extractor that parses the body and runs `T::validate`.
///
/// Must be the last extractor of a handler, so it runs after the guard stages.
#[derive(Debug, Clone)]
pub struct Validated<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: ValidatedInput,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        let body = parse_json_object(&bytes)?;
        T::validate(&body).map(Validated).map_err(ApiError::Validation)
    }
}

// =============================================================================
// Budget and expense bodies
// =============================================================================

/// Name and amount of a budget
#[derive(Debug, Clone, PartialEq, ToSchema)]
pub struct BudgetInput {
    #[schema(example = "Vacaciones")]
    pub name: String,
    /// Number or numeric string, greater than 0
    #[schema(value_type = String, example = "4000")]
    pub amount: Decimal,
}

/// Longest budget name the budgets table stores
pub const MAX_BUDGET_NAME_CHARS: usize = 255;

impl ValidatedInput for BudgetInput {
    fn validate(body: &JsonObject) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();
        FieldCheck::body(body, "name")
            .not_empty("El Nombre del Presupuesto es Obligatorio")
            .max_length(
                MAX_BUDGET_NAME_CHARS,
                "El Nombre del Presupuesto no puede superar 255 caracteres",
            )
            .finish(&mut errors);
        FieldCheck::body(body, "amount")
            .not_empty("La Cantidad del Presupuesto no puede ir vacia")
            .is_numeric("Cantidad No Valida")
            .greater_than_zero("El Presupuesto debe ser mayor a 0")
            .finish(&mut errors);

        build(errors, body, "amount", "Cantidad No Valida", |amount| Self {
            name: text_field(body, "name").trim().to_string(),
            amount,
        })
    }
}

/// Name and amount of an expense
#[derive(Debug, Clone, PartialEq, ToSchema)]
pub struct ExpenseInput {
    /// At most 100 characters
    #[schema(example = "Hotel")]
    pub name: String,
    /// Number or numeric string, greater than 0
    #[schema(value_type = String, example = "300")]
    pub amount: Decimal,
}

/// Longest expense name accepted
pub const MAX_EXPENSE_NAME_CHARS: usize = 100;

impl ValidatedInput for ExpenseInput {
    fn validate(body: &JsonObject) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();
        FieldCheck::body(body, "name")
            .not_empty("El Nombre del Gasto no puede ir Vacio")
            .max_length(
                MAX_EXPENSE_NAME_CHARS,
                "El Nombre del Gasto no puede superar 100 caracteres",
            )
            .finish(&mut errors);
        FieldCheck::body(body, "amount")
            .not_empty("La Cantidad del Gasto no puede ir vacia")
            .is_numeric("Cantidad No Valida")
            .greater_than_zero("El Gasto debe ser mayor a 0")
            .finish(&mut errors);

        build(errors, body, "amount", "Cantidad No Valida", |amount| Self {
            name: text_field(body, "name").trim().to_string(),
            amount,
        })
    }
}

/// Finish a name/amount body once every rule has run
fn build<T>(
    mut errors: Vec<FieldError>,
    body: &JsonObject,
    amount_path: &str,
    invalid_amount_msg: &str,
    make: impl FnOnce(Decimal) -> T,
) -> Result<T, Vec<FieldError>> {
    if !errors.is_empty() {
        return Err(errors);
    }
    match decimal_field(body, amount_path) {
        Some(amount) => Ok(make(amount)),
        // Passes the numeric pattern but does not fit a Decimal
        None => {
            errors.push(FieldError::new(
                amount_path,
                Location::Body,
                invalid_amount_msg,
                body.get(amount_path).cloned(),
            ));
            Err(errors)
        }
    }
}

// =============================================================================
// Account bodies
// =============================================================================

pub const INVALID_EMAIL_MESSAGE: &str = "El email no es valido";
pub const INVALID_TOKEN_MESSAGE: &str = "Token no Valido";
pub const CONFIRMATION_TOKEN_LENGTH: usize = 6;
pub const MIN_PASSWORD_CHARS: usize = 8;
/// Column widths of users.name and users.email
pub const MAX_USER_NAME_CHARS: usize = 50;
pub const MAX_EMAIL_CHARS: usize = 50;
pub const USER_NAME_TOO_LONG_MESSAGE: &str = "El nombre no puede superar 50 caracteres";
pub const EMAIL_TOO_LONG_MESSAGE: &str = "El email no puede superar 50 caracteres";

fn collect<T>(errors: Vec<FieldError>, make: impl FnOnce() -> T) -> Result<T, Vec<FieldError>> {
    if errors.is_empty() {
        Ok(make())
    } else {
        Err(errors)
    }
}

#[derive(Debug, Clone, ToSchema)]
pub struct CreateAccountInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl ValidatedInput for CreateAccountInput {
    fn validate(body: &JsonObject) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();
        FieldCheck::body(body, "name")
            .not_empty("El nombre es obligatorio")
            .max_length(MAX_USER_NAME_CHARS, USER_NAME_TOO_LONG_MESSAGE)
            .finish(&mut errors);
        FieldCheck::body(body, "password")
            .min_length(
                MIN_PASSWORD_CHARS,
                "La contraseña debe tener al menos 8 caracteres",
            )
            .finish(&mut errors);
        FieldCheck::body(body, "email")
            .is_email(INVALID_EMAIL_MESSAGE)
            .max_length(MAX_EMAIL_CHARS, EMAIL_TOO_LONG_MESSAGE)
            .finish(&mut errors);

        collect(errors, || Self {
            name: text_field(body, "name").trim().to_string(),
            email: text_field(body, "email"),
            password: text_field(body, "password"),
        })
    }
}

/// A 6-character confirmation or reset token in the body
#[derive(Debug, Clone, ToSchema)]
pub struct TokenInput {
    pub token: String,
}

impl ValidatedInput for TokenInput {
    fn validate(body: &JsonObject) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();
        FieldCheck::body(body, "token")
            .bail()
            .not_empty(INVALID_TOKEN_MESSAGE)
            .exact_length(CONFIRMATION_TOKEN_LENGTH, INVALID_TOKEN_MESSAGE)
            .finish(&mut errors);

        collect(errors, || Self {
            token: text_field(body, "token"),
        })
    }
}

#[derive(Debug, Clone, ToSchema)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl ValidatedInput for LoginInput {
    fn validate(body: &JsonObject) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();
        FieldCheck::body(body, "email")
            .is_email(INVALID_EMAIL_MESSAGE)
            .finish(&mut errors);
        FieldCheck::body(body, "password")
            .not_empty("La contraseña es obligatoria")
            .finish(&mut errors);

        collect(errors, || Self {
            email: text_field(body, "email"),
            password: text_field(body, "password"),
        })
    }
}

#[derive(Debug, Clone, ToSchema)]
pub struct EmailInput {
    pub email: String,
}

impl ValidatedInput for EmailInput {
    fn validate(body: &JsonObject) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();
        FieldCheck::body(body, "email")
            .is_email(INVALID_EMAIL_MESSAGE)
            .finish(&mut errors);

        collect(errors, || Self {
            email: text_field(body, "email"),
        })
    }
}

#[derive(Debug, Clone, ToSchema)]
pub struct NewPasswordInput {
    pub password: String,
}

impl ValidatedInput for NewPasswordInput {
    fn validate(body: &JsonObject) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();
        FieldCheck::body(body, "password")
            .min_length(
                MIN_PASSWORD_CHARS,
                "La contraseña debe tener al menos 8 caracteres",
            )
            .finish(&mut errors);

        collect(errors, || Self {
            password: text_field(body, "password"),
        })
    }
}

#[derive(Debug, Clone, ToSchema)]
pub struct UpdateProfileInput {
    pub name: String,
    pub email: String,
}

impl ValidatedInput for UpdateProfileInput {
    fn validate(body: &JsonObject) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();
        FieldCheck::body(body, "name")
            .not_empty("El Nombre no puede estar vacio")
            .max_length(MAX_USER_NAME_CHARS, USER_NAME_TOO_LONG_MESSAGE)
            .finish(&mut errors);
        FieldCheck::body(body, "email")
            .is_email(INVALID_EMAIL_MESSAGE)
            .max_length(MAX_EMAIL_CHARS, EMAIL_TOO_LONG_MESSAGE)
            .finish(&mut errors);

        collect(errors, || Self {
            name: text_field(body, "name").trim().to_string(),
            email: text_field(body, "email"),
        })
    }
}

#[derive(Debug, Clone, ToSchema)]
pub struct UpdatePasswordInput {
    pub current_password: String,
    pub password: String,
}

impl ValidatedInput for UpdatePasswordInput {
    fn validate(body: &JsonObject) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();
        FieldCheck::body(body, "current_password")
            .not_empty("El password actual no puede estar vacio")
            .finish(&mut errors);
        FieldCheck::body(body, "password")
            .min_length(MIN_PASSWORD_CHARS, "El nuevo Password es muy corto")
            .finish(&mut errors);

        collect(errors, || Self {
            current_password: text_field(body, "current_password"),
            password: text_field(body, "password"),
        })
    }
}

#[derive(Debug, Clone, ToSchema)]
pub struct CheckPasswordInput {
    pub password: String,
}

impl ValidatedInput for CheckPasswordInput {
    fn validate(body: &JsonObject) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();
        FieldCheck::body(body, "password")
            .not_empty("El password actual no puede estar vacio")
            .finish(&mut errors);

        collect(errors, || Self {
            password: text_field(body, "password"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn messages(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.msg.as_str()).collect()
    }

    #[test]
    fn test_empty_budget_body_reports_four_errors() {
        let errors = BudgetInput::validate(&JsonObject::new()).unwrap_err();
        assert_eq!(
            messages(&errors),
            vec![
                "El Nombre del Presupuesto es Obligatorio",
                "La Cantidad del Presupuesto no puede ir vacia",
                "Cantidad No Valida",
                "El Presupuesto debe ser mayor a 0",
            ]
        );
        assert!(errors.iter().all(|e| e.location == Location::Body));
        assert!(errors.iter().all(|e| e.value.is_none()));
    }

    #[test]
    fn test_budget_amount_rules() {
        let errors = BudgetInput::validate(&object(json!({ "name": "Viaje", "amount": "abc" })))
            .unwrap_err();
        assert_eq!(
            messages(&errors),
            vec!["Cantidad No Valida", "El Presupuesto debe ser mayor a 0"]
        );
        assert_eq!(errors[0].value, Some(json!("abc")));

        let errors =
            BudgetInput::validate(&object(json!({ "name": "Viaje", "amount": -5 }))).unwrap_err();
        assert_eq!(messages(&errors), vec!["El Presupuesto debe ser mayor a 0"]);

        let errors =
            BudgetInput::validate(&object(json!({ "name": "Viaje", "amount": 0 }))).unwrap_err();
        assert_eq!(messages(&errors), vec!["El Presupuesto debe ser mayor a 0"]);
    }

    #[test]
    fn test_budget_accepts_numbers_and_numeric_strings() {
        let input =
            BudgetInput::validate(&object(json!({ "name": " Viaje ", "amount": 4000 }))).unwrap();
        assert_eq!(input.name, "Viaje");
        assert_eq!(input.amount, Decimal::from(4000));

        let input =
            BudgetInput::validate(&object(json!({ "name": "Casa", "amount": "150.75" }))).unwrap();
        assert_eq!(input.amount, Decimal::from_str("150.75").unwrap());
    }

    #[test]
    fn test_expense_name_length() {
        let long = "a".repeat(MAX_EXPENSE_NAME_CHARS + 1);
        let errors =
            ExpenseInput::validate(&object(json!({ "name": long, "amount": 10 }))).unwrap_err();
        assert_eq!(
            messages(&errors),
            vec!["El Nombre del Gasto no puede superar 100 caracteres"]
        );

        let exact = "a".repeat(MAX_EXPENSE_NAME_CHARS);
        assert!(ExpenseInput::validate(&object(json!({ "name": exact, "amount": 10 }))).is_ok());
    }

    #[test]
    fn test_budget_name_length() {
        let long = "a".repeat(MAX_BUDGET_NAME_CHARS + 1);
        let errors =
            BudgetInput::validate(&object(json!({ "name": long, "amount": 10 }))).unwrap_err();
        assert_eq!(
            messages(&errors),
            vec!["El Nombre del Presupuesto no puede superar 255 caracteres"]
        );

        let exact = "ñ".repeat(MAX_BUDGET_NAME_CHARS);
        assert!(BudgetInput::validate(&object(json!({ "name": exact, "amount": 10 }))).is_ok());
    }

    #[test]
    fn test_user_field_lengths() {
        // 51 characters, otherwise a well-formed address
        let long_email = format!("{}@example.com", "a".repeat(39));
        let long_name = "b".repeat(MAX_USER_NAME_CHARS + 1);

        let errors = CreateAccountInput::validate(&object(json!({
            "name": long_name,
            "password": "12345678",
            "email": long_email
        })))
        .unwrap_err();
        assert_eq!(
            messages(&errors),
            vec![USER_NAME_TOO_LONG_MESSAGE, EMAIL_TOO_LONG_MESSAGE]
        );

        let errors = UpdateProfileInput::validate(&object(json!({
            "name": long_name,
            "email": long_email
        })))
        .unwrap_err();
        assert_eq!(
            messages(&errors),
            vec![USER_NAME_TOO_LONG_MESSAGE, EMAIL_TOO_LONG_MESSAGE]
        );

        let fits = CreateAccountInput::validate(&object(json!({
            "name": "b".repeat(MAX_USER_NAME_CHARS),
            "password": "12345678",
            "email": format!("{}@example.com", "a".repeat(38))
        })));
        assert!(fits.is_ok());
    }

    #[test]
    fn test_id_param_reports_one_error() {
        for (raw, expected) in [
            ("abc", "El ID del Presupuesto no es Valido"),
            ("1.5", "El ID del Presupuesto no es Valido"),
            ("", "El ID del Presupuesto no es Valido"),
            ("0", "Id no Valido"),
            ("-3", "Id no Valido"),
        ] {
            match parse_id_param(raw, "budgetId", "El ID del Presupuesto no es Valido", "Id no Valido") {
                Err(ApiError::Validation(errors)) => {
                    assert_eq!(errors.len(), 1, "raw = {:?}", raw);
                    assert_eq!(errors[0].msg, expected, "raw = {:?}", raw);
                    assert_eq!(errors[0].location, Location::Params);
                    assert_eq!(errors[0].path, "budgetId");
                }
                other => panic!("unexpected result for {:?}: {:?}", raw, other),
            }
        }

        assert_eq!(
            parse_id_param("42", "budgetId", "bad", "bad").unwrap(),
            42
        );
    }

    #[test]
    fn test_id_param_overflow() {
        let result = parse_id_param("99999999999999999999", "expenseId", "ID no Valido", "ID no Valido");
        assert!(matches!(result, Err(ApiError::Validation(errors)) if errors.len() == 1));
    }

    #[test]
    fn test_parse_json_object() {
        assert!(parse_json_object(b"").unwrap().is_empty());
        assert!(parse_json_object(b"  \n").unwrap().is_empty());
        assert!(parse_json_object(b"[1,2]").unwrap().is_empty());
        assert_eq!(
            parse_json_object(br#"{"name":"x"}"#).unwrap().get("name"),
            Some(&json!("x"))
        );
        assert!(matches!(
            parse_json_object(b"{not json"),
            Err(ApiError::BadRequest(message)) if message == INVALID_JSON_MESSAGE
        ));
    }

    #[test]
    fn test_create_account_rules() {
        let errors = CreateAccountInput::validate(&object(json!({
            "name": "",
            "password": "short",
            "email": "not-an-email"
        })))
        .unwrap_err();
        assert_eq!(
            messages(&errors),
            vec![
                "El nombre es obligatorio",
                "La contraseña debe tener al menos 8 caracteres",
                "El email no es valido",
            ]
        );

        let input = CreateAccountInput::validate(&object(json!({
            "name": "Juan",
            "password": "12345678",
            "email": "x@y.com"
        })))
        .unwrap();
        assert_eq!(input.email, "x@y.com");
    }

    #[test]
    fn test_token_rules() {
        let errors = TokenInput::validate(&object(json!({ "token": "123" }))).unwrap_err();
        assert_eq!(messages(&errors), vec!["Token no Valido"]);

        let errors = TokenInput::validate(&JsonObject::new()).unwrap_err();
        assert_eq!(errors.len(), 1);

        assert_eq!(
            TokenInput::validate(&object(json!({ "token": "123456" })))
                .unwrap()
                .token,
            "123456"
        );
    }

    #[test]
    fn test_field_error_serialization() {
        let error = FieldError::new("amount", Location::Body, "Cantidad No Valida", Some(json!("x")));
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({
                "type": "field",
                "value": "x",
                "msg": "Cantidad No Valida",
                "path": "amount",
                "location": "body"
            })
        );

        let missing = FieldError::new("name", Location::Body, "m", None);
        assert!(serde_json::to_value(&missing).unwrap().get("value").is_none());
    }
}
