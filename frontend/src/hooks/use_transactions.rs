use crate::services::analytics::compute_stats;
use crate::services::api::{redirect_to_login, ApiClient, ApiError};
use crate::services::date_utils;
use crate::services::logging::Logger;
use shared::{
    validate_transaction_form, CategorySet, MonthlyPoint, Stats, Transaction, TransactionForm,
    TransactionKind,
};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

#[derive(Clone, PartialEq)]
pub struct TransactionState {
    /// Raw list as fetched from the backend; never mutated in place.
    pub transactions: Vec<Transaction>,
    /// Monthly expense series, displayed as the backend computed it.
    pub monthly: Vec<MonthlyPoint>,
    pub stats: Stats,
    pub loading: bool,

    // Create-transaction form.
    pub amount: String,
    pub description: String,
    pub category: String,
    pub kind: TransactionKind,
    pub date: String,
    pub submitting: bool,
    pub form_error: Option<String>,
}

#[derive(Clone)]
pub struct UseTransactionsActions {
    pub refresh: Callback<()>,
    pub create_transaction: Callback<()>,
    pub delete_transaction: Callback<String>,
    pub set_amount: Callback<String>,
    pub set_description: Callback<String>,
    pub set_category: Callback<String>,
    /// Switching the kind also snaps the category to the first one
    /// registered for it.
    pub set_kind: Callback<TransactionKind>,
    pub set_date: Callback<String>,
}

pub struct UseTransactionsResult {
    pub state: TransactionState,
    pub actions: UseTransactionsActions,
}

/// Transaction store hook: holds the raw transaction list plus the
/// dashboard's derived figures, and exposes create/delete operations that
/// refetch on success.
#[hook]
pub fn use_transactions(
    api_client: &ApiClient,
    categories: &CategorySet,
) -> UseTransactionsResult {
    let transactions = use_state(Vec::<Transaction>::new);
    let monthly = use_state(Vec::<MonthlyPoint>::new);
    let stats = use_state(Stats::default);
    let loading = use_state(|| true);

    let amount = use_state(String::new);
    let description = use_state(String::new);
    let category = use_state(String::new);
    let kind = use_state(|| TransactionKind::Expense);
    let date = use_state(|| date_utils::format_iso(date_utils::today()));
    let submitting = use_state(|| false);
    let form_error = use_state(|| None::<String>);

    let refresh = {
        let api_client = api_client.clone();
        let transactions = transactions.clone();
        let monthly = monthly.clone();
        let stats = stats.clone();
        let loading = loading.clone();

        use_callback((), move |_, _| {
            let api_client = api_client.clone();
            let transactions = transactions.clone();
            let monthly = monthly.clone();
            let stats = stats.clone();
            let loading = loading.clone();

            spawn_local(async move {
                loading.set(true);
                let today = date_utils::today();

                match api_client.get_transactions().await {
                    Ok(list) => {
                        stats.set(compute_stats(&list, today));
                        transactions.set(list);
                    }
                    Err(ApiError::Unauthorized) => {
                        redirect_to_login();
                        return;
                    }
                    Err(e) => {
                        Logger::error_with_component(
                            "use_transactions",
                            &format!("failed to fetch transactions: {}", e),
                        );
                        stats.set(Stats::default());
                        transactions.set(Vec::new());
                    }
                }

                match api_client.get_monthly_analytics().await {
                    Ok(series) => monthly.set(series),
                    Err(ApiError::Unauthorized) => {
                        redirect_to_login();
                        return;
                    }
                    Err(e) => {
                        Logger::error_with_component(
                            "use_transactions",
                            &format!("failed to fetch monthly series: {}", e),
                        );
                        monthly.set(Vec::new());
                    }
                }

                loading.set(false);
            });
        })
    };

    // Reads the live form fields, so it is rebuilt every render instead of
    // memoized against stale snapshots.
    let create_transaction = {
        let api_client = api_client.clone();
        let amount = amount.clone();
        let description = description.clone();
        let category = category.clone();
        let kind = kind.clone();
        let date = date.clone();
        let submitting = submitting.clone();
        let form_error = form_error.clone();
        let refresh = refresh.clone();
        let categories = categories.clone();

        Callback::from(move |_: ()| {
            let api_client = api_client.clone();
            let amount = amount.clone();
            let description = description.clone();
            let category = category.clone();
            let kind = kind.clone();
            let date = date.clone();
            let submitting = submitting.clone();
            let form_error = form_error.clone();
            let refresh = refresh.clone();
            let categories = categories.clone();

            form_error.set(None);

            let form = TransactionForm {
                amount: (*amount).clone(),
                description: (*description).clone(),
                category: (*category).clone(),
                kind: Some(*kind),
                date: (*date).clone(),
            };

            // Validation failures never reach the network; they show up
            // inline next to the form.
            let request = match validate_transaction_form(&form, &categories) {
                Ok(request) => request,
                Err(e) => {
                    form_error.set(Some(e.to_string()));
                    return;
                }
            };

            spawn_local(async move {
                submitting.set(true);

                match api_client.create_transaction(&request).await {
                    Ok(_) => {
                        amount.set(String::new());
                        description.set(String::new());
                        let default_category = categories
                            .expense
                            .first()
                            .cloned()
                            .unwrap_or_default();
                        category.set(default_category);
                        kind.set(TransactionKind::Expense);
                        date.set(date_utils::format_iso(date_utils::today()));
                        refresh.emit(());
                    }
                    Err(ApiError::Unauthorized) => {
                        redirect_to_login();
                    }
                    Err(ApiError::Network(e)) => {
                        Logger::error_with_component(
                            "use_transactions",
                            &format!("create transaction failed: {}", e),
                        );
                        form_error.set(Some(
                            "Network error. Please check your connection and try again."
                                .to_string(),
                        ));
                    }
                    Err(e) => {
                        Logger::error_with_component(
                            "use_transactions",
                            &format!("create transaction failed: {}", e),
                        );
                        form_error
                            .set(Some("Failed to add transaction. Please try again.".to_string()));
                    }
                }

                submitting.set(false);
            });
        })
    };

    let delete_transaction = {
        let api_client = api_client.clone();
        let refresh = refresh.clone();

        use_callback((), move |id: String, _| {
            let api_client = api_client.clone();
            let refresh = refresh.clone();

            spawn_local(async move {
                match api_client.delete_transaction(&id).await {
                    Ok(()) => refresh.emit(()),
                    Err(ApiError::Unauthorized) => redirect_to_login(),
                    Err(e) => {
                        Logger::error_with_component(
                            "use_transactions",
                            &format!("failed to delete transaction {}: {}", id, e),
                        );
                    }
                }
            });
        })
    };

    let set_amount = {
        let amount = amount.clone();
        let form_error = form_error.clone();
        use_callback((), move |value: String, _| {
            amount.set(value);
            form_error.set(None);
        })
    };

    let set_description = {
        let description = description.clone();
        let form_error = form_error.clone();
        use_callback((), move |value: String, _| {
            description.set(value);
            form_error.set(None);
        })
    };

    let set_category = {
        let category = category.clone();
        let form_error = form_error.clone();
        use_callback((), move |value: String, _| {
            category.set(value);
            form_error.set(None);
        })
    };

    let set_kind = {
        let kind = kind.clone();
        let category = category.clone();
        let form_error = form_error.clone();
        use_callback(
            categories.clone(),
            move |value: TransactionKind, categories| {
                let list = match value {
                    TransactionKind::Income => &categories.income,
                    TransactionKind::Expense => &categories.expense,
                };
                category.set(list.first().cloned().unwrap_or_default());
                kind.set(value);
                form_error.set(None);
            },
        )
    };

    let set_date = {
        let date = date.clone();
        let form_error = form_error.clone();
        use_callback((), move |value: String, _| {
            date.set(value);
            form_error.set(None);
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

    // Give the form a starting category once the registry arrives.
    {
        let category = category.clone();
        use_effect_with(categories.clone(), move |categories| {
            if category.is_empty() {
                if let Some(first) = categories.expense.first() {
                    category.set(first.clone());
                }
            }
            || ()
        });
    }

    UseTransactionsResult {
        state: TransactionState {
            transactions: (*transactions).clone(),
            monthly: (*monthly).clone(),
            stats: (*stats).clone(),
            loading: *loading,
            amount: (*amount).clone(),
            description: (*description).clone(),
            category: (*category).clone(),
            kind: *kind,
            date: (*date).clone(),
            submitting: *submitting,
            form_error: (*form_error).clone(),
        },
        actions: UseTransactionsActions {
            refresh,
            create_transaction,
            delete_transaction,
            set_amount,
            set_description,
            set_category,
            set_kind,
            set_date,
        },
    }
}
