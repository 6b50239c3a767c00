use crate::services::api::{redirect_to_login, ApiClient, ApiError};
use crate::services::logging::Logger;
use shared::{CategorySet, CreateCategoryRequest, FormError, TransactionKind};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

#[derive(Clone, PartialEq)]
pub struct CategoryState {
    pub categories: CategorySet,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct UseCategoriesActions {
    pub refresh: Callback<()>,
    /// (name, kind): POSTs the new category, then refetches the registry.
    pub add_category: Callback<(String, TransactionKind)>,
}

pub struct UseCategoriesResult {
    pub state: CategoryState,
    pub actions: UseCategoriesActions,
}

/// Categories used when the registry cannot be fetched; the forms stay
/// usable and the next refresh replaces them.
fn fallback_categories() -> CategorySet {
    CategorySet {
        income: vec![
            "Salary".to_string(),
            "Business Income".to_string(),
            "Investment Returns".to_string(),
            "Other Income".to_string(),
        ],
        expense: vec![
            "Food & Dining".to_string(),
            "Rent & Housing".to_string(),
            "Transportation".to_string(),
            "Utilities".to_string(),
            "Other Expenses".to_string(),
        ],
    }
}

/// Category registry hook: fetches the valid income/expense category names
/// and keeps them available for forms and filters.
#[hook]
pub fn use_categories(api_client: &ApiClient) -> UseCategoriesResult {
    let categories = use_state(CategorySet::default);
    let loading = use_state(|| true);
    let error = use_state(|| None::<String>);

    let refresh = {
        let api_client = api_client.clone();
        let categories = categories.clone();
        let loading = loading.clone();
        let error = error.clone();

        use_callback((), move |_, _| {
            let api_client = api_client.clone();
            let categories = categories.clone();
            let loading = loading.clone();
            let error = error.clone();

            spawn_local(async move {
                loading.set(true);
                error.set(None);

                match api_client.get_categories().await {
                    Ok(fetched) => categories.set(fetched),
                    Err(ApiError::Unauthorized) => redirect_to_login(),
                    Err(e) => {
                        Logger::warn_with_component(
                            "use_categories",
                            &format!("falling back to default categories: {}", e),
                        );
                        error.set(Some(e.to_string()));
                        categories.set(fallback_categories());
                    }
                }

                loading.set(false);
            });
        })
    };

    let add_category = {
        let api_client = api_client.clone();
        let error = error.clone();
        let refresh = refresh.clone();

        use_callback((), move |(name, kind): (String, TransactionKind), _| {
            let api_client = api_client.clone();
            let error = error.clone();
            let refresh = refresh.clone();

            let name = name.trim().to_string();
            if name.is_empty() {
                error.set(Some(FormError::EmptyField("name").to_string()));
                return;
            }

            spawn_local(async move {
                let request = CreateCategoryRequest { name, kind };
                match api_client.add_category(&request).await {
                    Ok(()) => refresh.emit(()),
                    Err(ApiError::Unauthorized) => redirect_to_login(),
                    Err(e) => {
                        Logger::error_with_component(
                            "use_categories",
                            &format!("failed to add category: {}", e),
                        );
                        error.set(Some(e.to_string()));
                    }
                }
            });
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

    UseCategoriesResult {
        state: CategoryState {
            categories: (*categories).clone(),
            loading: *loading,
            error: (*error).clone(),
        },
        actions: UseCategoriesActions {
            refresh,
            add_category,
        },
    }
}
