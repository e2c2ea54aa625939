// 📐 Request Validation Pipeline
//
// An explicit ordered chain of stages runs before a handler touches storage.
// Each stage either passes (optionally attaching derived data to the request
// context) or aborts with a classified error; running a stage list is a plain
// fold over function pointers, not implicit middleware dispatch.
//
// Per-request state machine:
//   Received -> [resolve_account?] -> [check_payload?] -> [check_name_unique?]
//            -> handler -> Responded
// Any stage may jump straight to Responded via its error.

use serde_json::Value;

use crate::config::Limits;
use crate::db::AccountStore;
use crate::entities::{Account, AccountDraft};
use crate::error::ApiError;

// ============================================================================
// REQUEST CONTEXT
// ============================================================================

/// Per-request bag of route parameters, parsed body, and data attached by
/// earlier stages for later stages and the handler. One context per request,
/// never shared.
#[derive(Debug, Default)]
pub struct RequestContext {
    /// Raw id route parameter, exactly as it appeared in the path
    pub raw_id: Option<String>,

    /// Parsed JSON request body (create/update only)
    pub body: Option<Value>,

    /// Attached by `resolve_account`: the existing account for this id
    pub account: Option<Account>,

    /// Attached by `check_payload`: trimmed name + coerced budget
    pub draft: Option<AccountDraft>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, raw_id: impl Into<String>) -> Self {
        self.raw_id = Some(raw_id.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

// ============================================================================
// STAGES
// ============================================================================

/// One pipeline stage: pass (enriching the context) or abort classified.
pub type Stage = fn(&dyn AccountStore, &Limits, &mut RequestContext) -> Result<(), ApiError>;

/// Stages for operations addressing an existing account (get, delete).
pub const FETCH_STAGES: &[Stage] = &[resolve_account];

/// Stages for create: shape first, then uniqueness against live store state.
pub const CREATE_STAGES: &[Stage] = &[check_payload, check_name_unique];

/// Stages for update: existence, then the same validation set as create,
/// with the resolved account excluded from the uniqueness scan.
pub const UPDATE_STAGES: &[Stage] = &[resolve_account, check_payload, check_name_unique];

/// Run the stages in order; the first abort wins and nothing after it runs.
pub fn run_stages(
    stages: &[Stage],
    store: &dyn AccountStore,
    limits: &Limits,
    ctx: &mut RequestContext,
) -> Result<(), ApiError> {
    for stage in stages {
        stage(store, limits, ctx)?;
    }
    Ok(())
}

/// Existence resolver: confirm the route id names a stored account and attach
/// it to the context. Performs no other validation. Unparseable ids cannot
/// name an account, so they resolve to the same 404 as unknown ones.
pub fn resolve_account(
    store: &dyn AccountStore,
    _limits: &Limits,
    ctx: &mut RequestContext,
) -> Result<(), ApiError> {
    let raw = ctx.raw_id.as_deref().unwrap_or_default();

    let id: i64 = match raw.parse() {
        Ok(id) => id,
        Err(_) => return Err(ApiError::NotFound),
    };

    match store.get_by_id(id)? {
        Some(account) => {
            ctx.account = Some(account);
            Ok(())
        }
        None => Err(ApiError::NotFound),
    }
}

/// Payload shape validator: ordered structural checks on the request body,
/// before any store interaction. On success attaches the normalized draft;
/// trimming happens here exactly once, nowhere else.
pub fn check_payload(
    _store: &dyn AccountStore,
    limits: &Limits,
    ctx: &mut RequestContext,
) -> Result<(), ApiError> {
    let body = ctx.body.clone().unwrap_or(Value::Null);
    let name = body.get("name").cloned().unwrap_or(Value::Null);
    let budget = body.get("budget").cloned().unwrap_or(Value::Null);

    // 1. Both fields present (JSON null counts as missing)
    match (name.is_null(), budget.is_null()) {
        (true, true) => {
            return Err(ApiError::InvalidPayload(
                "name and budget are required".to_string(),
            ))
        }
        (true, false) => return Err(ApiError::InvalidPayload("name is required".to_string())),
        (false, true) => return Err(ApiError::InvalidPayload("budget is required".to_string())),
        (false, false) => {}
    }

    // 2. Name is text and its trimmed length is within bounds
    let Some(name) = name.as_str() else {
        return Err(ApiError::InvalidPayload("name must be a string".to_string()));
    };
    let name = name.trim();
    let length = name.chars().count();
    if length < limits.name_min || length > limits.name_max {
        return Err(ApiError::InvalidPayload(format!(
            "name must be between {} and {} characters",
            limits.name_min, limits.name_max
        )));
    }

    // 3. Budget coerces to a finite number
    let Some(budget) = coerce_budget(&budget) else {
        return Err(ApiError::InvalidPayload(
            "budget must be a number".to_string(),
        ));
    };

    // 4. Coerced budget is within bounds (inclusive)
    if budget < limits.budget_min || budget > limits.budget_max {
        return Err(ApiError::InvalidPayload(format!(
            "budget must be between {} and {}",
            limits.budget_min, limits.budget_max
        )));
    }

    ctx.draft = Some(AccountDraft::new(name, budget));
    Ok(())
}

/// Name uniqueness validator: no *other* stored account may hold the trimmed
/// candidate name (case-sensitive exact match). On update the resolved
/// account's own id is excluded, so keeping the current name is allowed.
/// Must run after `check_payload` - it reads the trimmed draft, never the
/// raw body.
pub fn check_name_unique(
    store: &dyn AccountStore,
    _limits: &Limits,
    ctx: &mut RequestContext,
) -> Result<(), ApiError> {
    let Some(draft) = ctx.draft.as_ref() else {
        return Err(ApiError::Internal(
            "uniqueness check ran before payload validation".to_string(),
        ));
    };
    let own_id = ctx.account.as_ref().map(|a| a.id);

    let taken = store
        .get_all()?
        .into_iter()
        .any(|a| a.name == draft.name && Some(a.id) != own_id);

    if taken {
        return Err(ApiError::Conflict("name already exists".to_string()));
    }
    Ok(())
}

fn coerce_budget(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|b| b.is_finite()),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok().filter(|b| b.is_finite())
        }
        _ => None,
    }
}

// ============================================================================
// TESTS
// ============================================================================
