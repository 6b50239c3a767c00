use crate::services::analytics::compute_budget_rollup;
use crate::services::api::{redirect_to_login, ApiClient, ApiError};
use crate::services::date_utils;
use crate::services::logging::Logger;
use chrono::Datelike;
use shared::{validate_budget_form, BudgetComparison, BudgetStatus, UpdateBudgetRequest};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

#[derive(Clone, PartialEq)]
pub struct BudgetState {
    /// Budgets rolled up against current-month spending.
    pub budgets: Vec<BudgetStatus>,
    /// Server-computed comparison series for the chart, stored as-is.
    pub comparison: Vec<BudgetComparison>,
    pub loading: bool,

    // Create-budget form.
    pub category: String,
    pub amount: String,
    pub submitting: bool,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct UseBudgetsActions {
    pub refresh: Callback<()>,
    pub create_budget: Callback<()>,
    /// (budget id, new amount text).
    pub update_budget: Callback<(String, String)>,
    pub delete_budget: Callback<String>,
    pub set_category: Callback<String>,
    pub set_amount: Callback<String>,
}

pub struct UseBudgetsResult {
    pub state: BudgetState,
    pub actions: UseBudgetsActions,
}

/// Budget view hook: fetches budgets and transactions as a concurrent
/// pair, joins them into the spent rollup, and exposes the budget CRUD
/// operations. Fetch failures degrade to empty lists; the rollup runs on
/// whatever arrived.
#[hook]
pub fn use_budgets(api_client: &ApiClient) -> UseBudgetsResult {
    let budgets = use_state(Vec::<BudgetStatus>::new);
    let comparison = use_state(Vec::<BudgetComparison>::new);
    let loading = use_state(|| true);

    let category = use_state(String::new);
    let amount = use_state(String::new);
    let submitting = use_state(|| false);
    let error = use_state(|| None::<String>);

    let refresh = {
        let api_client = api_client.clone();
        let budgets = budgets.clone();
        let comparison = comparison.clone();
        let loading = loading.clone();

        use_callback((), move |_, _| {
            let api_client = api_client.clone();
            let budgets = budgets.clone();
            let comparison = comparison.clone();
            let loading = loading.clone();

            spawn_local(async move {
                loading.set(true);

                // Budgets and transactions are independent; fetch them as a
                // pair and join before the rollup.
                let (transactions_result, budgets_result) =
                    futures::join!(api_client.get_transactions(), api_client.get_budgets());

                if transactions_result == Err(ApiError::Unauthorized)
                    || budgets_result == Err(ApiError::Unauthorized)
                {
                    redirect_to_login();
                    return;
                }

                let transactions = transactions_result.unwrap_or_else(|e| {
                    Logger::error_with_component(
                        "use_budgets",
                        &format!("failed to fetch transactions: {}", e),
                    );
                    Vec::new()
                });
                let budget_list = budgets_result.unwrap_or_else(|e| {
                    Logger::error_with_component(
                        "use_budgets",
                        &format!("failed to fetch budgets: {}", e),
                    );
                    Vec::new()
                });

                let today = date_utils::today();
                budgets.set(compute_budget_rollup(
                    &budget_list,
                    &transactions,
                    today.month(),
                    today.year(),
                ));

                match api_client.get_budget_comparison().await {
                    Ok(series) => comparison.set(series),
                    Err(ApiError::Unauthorized) => {
                        redirect_to_login();
                        return;
                    }
                    Err(e) => {
                        Logger::error_with_component(
                            "use_budgets",
                            &format!("failed to fetch budget comparison: {}", e),
                        );
                        comparison.set(Vec::new());
                    }
                }

                loading.set(false);
            });
        })
    };

    // Reads the live form fields, so it is rebuilt every render instead of
    // memoized against stale snapshots.
    let create_budget = {
        let api_client = api_client.clone();
        let category = category.clone();
        let amount = amount.clone();
        let submitting = submitting.clone();
        let error = error.clone();
        let refresh = refresh.clone();

        Callback::from(move |_: ()| {
            let api_client = api_client.clone();
            let category = category.clone();
            let amount = amount.clone();
            let submitting = submitting.clone();
            let error = error.clone();
            let refresh = refresh.clone();

            error.set(None);

            let today = date_utils::today();
            let request = match validate_budget_form(
                &category,
                &amount,
                today.month(),
                today.year(),
            ) {
                Ok(request) => request,
                Err(e) => {
                    error.set(Some(e.to_string()));
                    return;
                }
            };

            spawn_local(async move {
                submitting.set(true);

                match api_client.create_budget(&request).await {
                    Ok(_) => {
                        amount.set(String::new());
                        refresh.emit(());
                    }
                    Err(ApiError::Unauthorized) => redirect_to_login(),
                    Err(e) => {
                        Logger::error_with_component(
                            "use_budgets",
                            &format!("failed to create budget: {}", e),
                        );
                        error.set(Some(e.to_string()));
                    }
                }

                submitting.set(false);
            });
        })
    };

    let update_budget = {
        let api_client = api_client.clone();
        let error = error.clone();
        let refresh = refresh.clone();

        use_callback((), move |(id, new_amount): (String, String), _| {
            let api_client = api_client.clone();
            let error = error.clone();
            let refresh = refresh.clone();

            error.set(None);

            let amount = match new_amount.trim().parse::<f64>() {
                Ok(value) if value > 0.0 => value,
                _ => {
                    error.set(Some(
                        "Please enter a valid amount greater than 0".to_string(),
                    ));
                    return;
                }
            };

            spawn_local(async move {
                match api_client
                    .update_budget(&id, &UpdateBudgetRequest { amount })
                    .await
                {
                    Ok(_) => refresh.emit(()),
                    Err(ApiError::Unauthorized) => redirect_to_login(),
                    Err(e) => {
                        Logger::error_with_component(
                            "use_budgets",
                            &format!("failed to update budget {}: {}", id, e),
                        );
                        error.set(Some(e.to_string()));
                    }
                }
            });
        })
    };

    let delete_budget = {
        let api_client = api_client.clone();
        let error = error.clone();
        let refresh = refresh.clone();

        use_callback((), move |id: String, _| {
            let api_client = api_client.clone();
            let error = error.clone();
            let refresh = refresh.clone();

            spawn_local(async move {
                match api_client.delete_budget(&id).await {
                    Ok(()) => refresh.emit(()),
                    Err(ApiError::Unauthorized) => redirect_to_login(),
                    Err(e) => {
                        Logger::error_with_component(
                            "use_budgets",
                            &format!("failed to delete budget {}: {}", id, e),
                        );
                        error.set(Some(e.to_string()));
                    }
                }
            });
        })
    };

    let set_category = {
        let category = category.clone();
        let error = error.clone();
        use_callback((), move |value: String, _| {
            category.set(value);
            error.set(None);
        })
    };

    let set_amount = {
        let amount = amount.clone();
        let error = error.clone();
        use_callback((), move |value: String, _| {
            amount.set(value);
            error.set(None);
        })
    };

    // Initial fetch on mount.
    {
        let refresh = refresh.clone();
        use_effect_with((), move |_| {
            refresh.emit(());
            || ()
        });
    }

    UseBudgetsResult {
        state: BudgetState {
            budgets: (*budgets).clone(),
            comparison: (*comparison).clone(),
            loading: *loading,
            category: (*category).clone(),
            amount: (*amount).clone(),
            submitting: *submitting,
            error: (*error).clone(),
        },
        actions: UseBudgetsActions {
            refresh,
            create_budget,
            update_budget,
            delete_budget,
            set_category,
            set_amount,
        },
    }
}
