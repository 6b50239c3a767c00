use chrono::NaiveDate;
use shared::{CategorySelection, KindSelection, TransactionFilter};

/// One edit to the draft filter, as emitted by the filter form controls.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterEdit {
    Category(CategorySelection),
    Kind(KindSelection),
    StartDate(NaiveDate),
    EndDate(NaiveDate),
}

/// Owns the two filter snapshots behind the analytics view.
///
/// The `draft` is what the form controls edit; the `applied` snapshot is
/// what drives the displayed aggregates. Nothing the user types takes
/// effect until an explicit `submit` copies draft over applied. Each
/// submit (and reset) bumps a sequence number so that a server response
/// belonging to a superseded submission can be recognized and dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterController {
    draft: TransactionFilter,
    applied: TransactionFilter,
    submit_seq: u64,
}

impl FilterController {
    pub fn new(today: NaiveDate) -> Self {
        let default = TransactionFilter::default_for(today);
        Self {
            draft: default.clone(),
            applied: default,
            submit_seq: 0,
        }
    }

    pub fn draft(&self) -> &TransactionFilter {
        &self.draft
    }

    pub fn applied(&self) -> &TransactionFilter {
        &self.applied
    }

    pub fn current_seq(&self) -> u64 {
        self.submit_seq
    }

    /// Whether a response tagged with `seq` still belongs to the latest
    /// submission.
    pub fn is_current(&self, seq: u64) -> bool {
        self.submit_seq == seq
    }

    /// Apply one edit to the draft. The applied snapshot is untouched, so
    /// the displayed aggregates do not move. Switching the kind clears the
    /// draft category: whatever was selected belonged to the old kind's
    /// list.
    pub fn edit_draft(&mut self, edit: FilterEdit) {
        match edit {
            FilterEdit::Category(category) => self.draft.category = category,
            FilterEdit::Kind(kind) => {
                self.draft.kind = kind;
                self.draft.category = CategorySelection::All;
            }
            FilterEdit::StartDate(start_date) => self.draft.start_date = start_date,
            FilterEdit::EndDate(end_date) => self.draft.end_date = end_date,
        }
    }

    /// Commit the draft. Returns the newly applied snapshot together with
    /// the sequence number identifying this submission.
    pub fn submit(&mut self) -> (TransactionFilter, u64) {
        self.applied = self.draft.clone();
        self.submit_seq += 1;
        (self.applied.clone(), self.submit_seq)
    }

    /// Restore both slots to the default filter. Bumps the sequence number
    /// so an in-flight submit response cannot overwrite the reset view.
    pub fn reset(&mut self, today: NaiveDate) -> TransactionFilter {
        let default = TransactionFilter::default_for(today);
        self.draft = default.clone();
        self.applied = default.clone();
        self.submit_seq += 1;
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::TransactionKind;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 19).unwrap()
    }

    #[test]
    fn test_new_starts_with_identical_default_slots() {
        let controller = FilterController::new(today());
        assert_eq!(controller.draft(), controller.applied());
        assert_eq!(*controller.applied(), TransactionFilter::default_for(today()));
    }

    #[test]
    fn test_edit_draft_leaves_applied_untouched() {
        let mut controller = FilterController::new(today());
        controller.edit_draft(FilterEdit::Category(CategorySelection::Named(
            "Food".to_string(),
        )));
        controller.edit_draft(FilterEdit::StartDate(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        ));

        assert_eq!(*controller.applied(), TransactionFilter::default_for(today()));
        assert_eq!(
            controller.draft().category,
            CategorySelection::Named("Food".to_string())
        );
    }

    #[test]
    fn test_kind_edit_resets_draft_category() {
        let mut controller = FilterController::new(today());
        controller.edit_draft(FilterEdit::Category(CategorySelection::Named(
            "Food".to_string(),
        )));
        controller.edit_draft(FilterEdit::Kind(KindSelection::Only(
            TransactionKind::Income,
        )));

        assert_eq!(controller.draft().category, CategorySelection::All);
        assert_eq!(
            controller.draft().kind,
            KindSelection::Only(TransactionKind::Income)
        );
    }

    #[test]
    fn test_submit_copies_draft_and_bumps_seq() {
        let mut controller = FilterController::new(today());
        controller.edit_draft(FilterEdit::Kind(KindSelection::All));

        let before = controller.current_seq();
        let (applied, seq) = controller.submit();

        assert_eq!(seq, before + 1);
        assert_eq!(applied, *controller.applied());
        assert_eq!(controller.applied(), controller.draft());
        assert_eq!(applied.kind, KindSelection::All);
    }

    #[test]
    fn test_stale_submission_is_detected() {
        let mut controller = FilterController::new(today());
        let (_, first_seq) = controller.submit();
        assert!(controller.is_current(first_seq));

        let (_, second_seq) = controller.submit();
        assert!(!controller.is_current(first_seq));
        assert!(controller.is_current(second_seq));
    }

    #[test]
    fn test_reset_restores_defaults_in_both_slots() {
        let mut controller = FilterController::new(today());
        controller.edit_draft(FilterEdit::Category(CategorySelection::Named(
            "Rent".to_string(),
        )));
        controller.edit_draft(FilterEdit::Kind(KindSelection::All));
        let (_, seq) = controller.submit();

        controller.reset(today());

        let default = TransactionFilter::default_for(today());
        assert_eq!(*controller.draft(), default);
        assert_eq!(*controller.applied(), default);
        // the reset supersedes the earlier submission
        assert!(!controller.is_current(seq));
    }
}
