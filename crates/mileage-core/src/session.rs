//! The ledger session: forms, active view, notices and the two-step clear.
//!
//! A session is the single owner of all mutable ledger state. Front-ends
//! edit the forms through the accessors, invoke the operations, and then
//! render [`LedgerSession::notice`] and [`LedgerSession::view`].

use chrono::NaiveDate;
use log::debug;
use uuid::Uuid;

use crate::distance::DistanceEstimator;
use crate::entry::{build_expense, build_trip, Entry, ExpenseForm, TripForm};
use crate::error::{MileageError, Result};
use crate::export::{export_ledger, ExportedFile};
use crate::notice::{Clock, Notice, NoticeKind, PendingAction, SystemClock};
use crate::receipt::{ReceiptCapture, ReceiptImage};
use crate::storage::{EntryStore, MemoryStore};

pub const TRIP_ADDED: &str = "Trip added successfully!";
pub const EXPENSE_ADDED: &str = "Expense added successfully!";
pub const MILEAGE_UNAVAILABLE: &str =
    "Mileage calculation is unavailable. You can still enter mileage manually.";
pub const MILEAGE_FAILED: &str = "Mileage calculation failed.";
pub const RECEIPT_CAPTURED: &str = "Receipt photo captured!";
pub const RECEIPT_CANCELLED: &str = "No photo captured.";
pub const RECEIPT_CLEARED: &str = "Receipt photo cleared.";
pub const CLEAR_CONFIRM: &str = "Press \"Clear All Data\" again to confirm.";
pub const CLEARED: &str = "All data cleared!";
pub const EXPORTED: &str = "Excel file exported successfully!";

/// Which part of the UI is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    AddTrip,
    AddExpense,
    Log,
}

/// Result of a clear request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    ConfirmationRequired,
    Cleared,
}

/// Session controller over an entry store.
pub struct LedgerSession<S: EntryStore = MemoryStore> {
    store: S,
    trip_form: TripForm,
    expense_form: ExpenseForm,
    view: View,
    notice: Option<Notice>,
    estimator: Option<DistanceEstimator>,
    capture: ReceiptCapture,
    clock: Box<dyn Clock>,
}

impl LedgerSession<MemoryStore> {
    /// Empty in-memory session with no estimator and no capture capability.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl Default for LedgerSession<MemoryStore> {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<S: EntryStore> LedgerSession<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            trip_form: TripForm::default(),
            expense_form: ExpenseForm::default(),
            view: View::default(),
            notice: None,
            estimator: None,
            capture: ReceiptCapture::unavailable(),
            clock: Box::new(SystemClock),
        }
    }

    /// Enable mileage calculation.
    pub fn with_estimator(mut self, estimator: Option<DistanceEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn with_capture(mut self, capture: ReceiptCapture) -> Self {
        self.capture = capture;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn entries(&self) -> &[Entry] {
        self.store.all()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn trip_form(&self) -> &TripForm {
        &self.trip_form
    }

    pub fn trip_form_mut(&mut self) -> &mut TripForm {
        &mut self.trip_form
    }

    pub fn expense_form(&self) -> &ExpenseForm {
        &self.expense_form
    }

    pub fn expense_form_mut(&mut self) -> &mut ExpenseForm {
        &mut self.expense_form
    }

    pub fn can_calculate_mileage(&self) -> bool {
        self.estimator.is_some()
    }

    pub fn can_capture_receipt(&self) -> bool {
        self.capture.is_available()
    }

    /// The current notice, unless it has expired.
    pub fn notice(&self) -> Option<&Notice> {
        let now = self.clock.now();
        self.notice.as_ref().filter(|n| n.is_visible(now))
    }

    fn show(&mut self, kind: NoticeKind, text: impl Into<String>) {
        let notice = Notice::new(kind, text, self.clock.now());
        debug!("Notice ({}): {}", kind.as_str(), notice.text);
        self.notice = Some(notice);
    }

    fn show_error(&mut self, err: &MileageError) {
        self.show(NoticeKind::Error, err.to_string());
    }

    /// Validate the trip form and append the trip.
    ///
    /// On success the form is reset and the log view becomes active. On
    /// failure an error notice is shown and nothing else changes.
    pub fn add_trip(&mut self) -> Result<Uuid> {
        let trip = match build_trip(&self.trip_form) {
            Ok(trip) => trip,
            Err(e) => {
                self.show_error(&e);
                return Err(e);
            }
        };

        let id = trip.id;
        self.store.append(Entry::Trip(trip));
        self.trip_form = TripForm::default();
        self.view = View::Log;
        self.show(NoticeKind::Success, TRIP_ADDED);
        Ok(id)
    }

    /// Validate the expense form and append the expense with its receipt.
    pub fn add_expense(&mut self) -> Result<Uuid> {
        let expense = match build_expense(&self.expense_form) {
            Ok(expense) => expense,
            Err(e) => {
                self.show_error(&e);
                return Err(e);
            }
        };

        let id = expense.id;
        self.store.append(Entry::Expense(expense));
        self.expense_form = ExpenseForm::default();
        self.view = View::Log;
        self.show(NoticeKind::Success, EXPENSE_ADDED);
        Ok(id)
    }

    /// Pre-fill the trip distance from the trip form's locations.
    ///
    /// Returns `Ok(None)` when mileage calculation is unavailable. The
    /// exclusive borrow for the whole lookup rules out a second concurrent
    /// request.
    pub async fn calculate_mileage(&mut self) -> Result<Option<f64>> {
        let result = match &self.estimator {
            Some(estimator) => {
                estimator
                    .estimate(&self.trip_form.start_location, &self.trip_form.end_location)
                    .await
            }
            None => {
                self.show(NoticeKind::Info, MILEAGE_UNAVAILABLE);
                return Ok(None);
            }
        };

        match result {
            Ok(miles) => {
                self.trip_form.distance = format!("{:.1}", miles);
                self.show(
                    NoticeKind::Success,
                    format!("Mileage calculated: {:.1} miles", miles),
                );
                Ok(Some(miles))
            }
            Err(e) => {
                let text = mileage_failure_text(&e);
                self.show(NoticeKind::Error, text);
                Err(e)
            }
        }
    }

    /// Capture a receipt and stage it on the expense form.
    ///
    /// Returns `Ok(false)` if the user cancelled.
    pub fn capture_receipt(&mut self) -> Result<bool> {
        match self.capture.capture() {
            Ok(Some(image)) => {
                self.attach_receipt(image);
                Ok(true)
            }
            Ok(None) => {
                self.show(NoticeKind::Info, RECEIPT_CANCELLED);
                Ok(false)
            }
            Err(e) => {
                self.show_error(&e);
                Err(e)
            }
        }
    }

    /// Stage an already acquired image on the expense form.
    pub fn attach_receipt(&mut self, image: ReceiptImage) {
        debug!("Staged {:?}", image);
        self.expense_form.receipt = Some(image);
        self.show(NoticeKind::Success, RECEIPT_CAPTURED);
    }

    /// Drop the staged receipt. Logged expenses are untouched.
    pub fn clear_receipt(&mut self) {
        self.expense_form.receipt = None;
        self.show(NoticeKind::Info, RECEIPT_CLEARED);
    }

    /// Two-step bulk clear.
    ///
    /// The first request arms a confirmation notice; a second request while
    /// that notice is still visible empties the ledger.
    pub fn request_clear(&mut self) -> ClearOutcome {
        let armed = self
            .notice()
            .map(|n| n.pending == Some(PendingAction::ClearAll))
            .unwrap_or(false);

        if armed {
            self.store.clear();
            self.view = View::Log;
            self.show(NoticeKind::Success, CLEARED);
            ClearOutcome::Cleared
        } else {
            let notice = Notice::new(NoticeKind::Info, CLEAR_CONFIRM, self.clock.now())
                .with_pending(PendingAction::ClearAll);
            self.notice = Some(notice);
            ClearOutcome::ConfirmationRequired
        }
    }

    /// Export the ledger to an xlsx workbook.
    pub fn export(&mut self, today: NaiveDate) -> Result<ExportedFile> {
        self.export_with(today, |_| Ok(())).map(|(file, ())| file)
    }

    /// Export the ledger and hand the workbook to `save`.
    ///
    /// The success notice is shown only once `save` has succeeded; a failed
    /// save shows an error notice instead.
    pub fn export_with<T, F>(&mut self, today: NaiveDate, save: F) -> Result<(ExportedFile, T)>
    where
        F: FnOnce(&ExportedFile) -> Result<T>,
    {
        let outcome = export_ledger(self.store.all(), today).and_then(|file| {
            let saved = save(&file)?;
            Ok((file, saved))
        });
        match outcome {
            Ok(done) => {
                self.show(NoticeKind::Success, EXPORTED);
                Ok(done)
            }
            Err(e) => {
                self.show_error(&e);
                Err(e)
            }
        }
    }
}

fn mileage_failure_text(err: &MileageError) -> String {
    match err {
        MileageError::Validation(message) => message.clone(),
        MileageError::Network(message) => format!(
            "{}\n\nThe directions service could not be reached: {}",
            MILEAGE_FAILED, message
        ),
        other => format!(
            "{}\n\nReason: {}\n\nAlso verify that the \"Directions API\" is enabled and project billing is active.",
            MILEAGE_FAILED, other
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DirectionsConfig;
    use crate::notice::tests::ManualClock;
    use crate::receipt::tests::ONE_PIXEL_PNG;
    use crate::receipt::{CaptureSource, ImageSource};

    fn session() -> (LedgerSession, ManualClock) {
        let clock = ManualClock::new();
        let session = LedgerSession::in_memory().with_clock(clock.clone());
        (session, clock)
    }

    fn fill_trip(session: &mut LedgerSession, date: &str, miles: &str) {
        *session.trip_form_mut() = TripForm::new(date, miles).with_locations("Home", "Field 3");
    }

    fn notice_text(session: &LedgerSession) -> Option<String> {
        session.notice().map(|n| n.text.clone())
    }

    struct Canned(Option<Vec<u8>>);

    impl ImageSource for Canned {
        fn acquire(&self, _source: CaptureSource) -> Result<Option<Vec<u8>>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_add_trip_success_side_effects() {
        let (mut session, _) = session();
        fill_trip(&mut session, "2024-05-01", "12.4");

        session.add_trip().unwrap();

        assert_eq!(session.entries().len(), 1);
        assert_eq!(session.trip_form(), &TripForm::default());
        assert_eq!(session.view(), View::Log);
        assert_eq!(notice_text(&session).as_deref(), Some(TRIP_ADDED));
        assert_eq!(session.notice().map(|n| n.kind), Some(NoticeKind::Success));
    }

    #[test]
    fn test_add_trip_failure_leaves_state() {
        let (mut session, _) = session();
        fill_trip(&mut session, "2024-05-01", "abc");
        let before = session.trip_form().clone();

        assert!(session.add_trip().is_err());

        assert!(session.entries().is_empty());
        assert_eq!(session.trip_form(), &before);
        assert_eq!(session.view(), View::AddTrip);
        assert_eq!(
            notice_text(&session).as_deref(),
            Some("Please enter a date and valid mileage before adding the trip.")
        );
    }

    #[test]
    fn test_add_expense_consumes_receipt() {
        let (mut session, _) = session();
        session.attach_receipt(ReceiptImage::from_bytes(ONE_PIXEL_PNG).unwrap());
        let form = session.expense_form_mut();
        form.date = "2024-05-02".into();
        form.description = "Parking".into();
        form.amount = "8.00".into();

        session.add_expense().unwrap();

        assert!(session.entries()[0].has_receipt());
        assert!(session.expense_form().receipt.is_none());
        assert_eq!(notice_text(&session).as_deref(), Some(EXPENSE_ADDED));
    }

    #[test]
    fn test_entries_newest_first() {
        let (mut session, _) = session();
        fill_trip(&mut session, "2024-05-01", "1");
        session.add_trip().unwrap();
        fill_trip(&mut session, "2024-05-03", "2");
        session.add_trip().unwrap();
        fill_trip(&mut session, "2024-05-02", "3");
        session.add_trip().unwrap();

        let dates: Vec<String> = session
            .entries()
            .iter()
            .map(|e| e.date().to_string())
            .collect();
        assert_eq!(dates, vec!["2024-05-03", "2024-05-02", "2024-05-01"]);
    }

    #[test]
    fn test_notice_expires() {
        let (mut session, clock) = session();
        session.clear_receipt();
        assert_eq!(notice_text(&session).as_deref(), Some(RECEIPT_CLEARED));
        clock.advance(10);
        assert!(session.notice().is_none());
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let (mut session, _) = session();
        fill_trip(&mut session, "2024-05-01", "5");
        session.add_trip().unwrap();
        session.set_view(View::AddTrip);

        assert_eq!(session.request_clear(), ClearOutcome::ConfirmationRequired);
        assert_eq!(session.entries().len(), 1);
        assert_eq!(notice_text(&session).as_deref(), Some(CLEAR_CONFIRM));

        assert_eq!(session.request_clear(), ClearOutcome::Cleared);
        assert!(session.entries().is_empty());
        assert_eq!(session.view(), View::Log);
        assert_eq!(notice_text(&session).as_deref(), Some(CLEARED));
    }

    #[test]
    fn test_clear_confirmation_expires() {
        let (mut session, clock) = session();
        fill_trip(&mut session, "2024-05-01", "5");
        session.add_trip().unwrap();

        session.request_clear();
        clock.advance(11);
        assert_eq!(session.request_clear(), ClearOutcome::ConfirmationRequired);
        assert_eq!(session.entries().len(), 1);
    }

    #[test]
    fn test_other_notice_cancels_confirmation() {
        let (mut session, _) = session();
        fill_trip(&mut session, "2024-05-01", "5");
        session.add_trip().unwrap();

        session.request_clear();
        session.clear_receipt();
        assert_eq!(session.request_clear(), ClearOutcome::ConfirmationRequired);
        assert_eq!(session.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_calculate_without_estimator_is_informational() {
        let (mut session, _) = session();
        session.trip_form_mut().start_location = "A".into();
        session.trip_form_mut().end_location = "B".into();

        assert_eq!(session.calculate_mileage().await.unwrap(), None);
        assert_eq!(session.notice().map(|n| n.kind), Some(NoticeKind::Info));
        assert_eq!(notice_text(&session).as_deref(), Some(MILEAGE_UNAVAILABLE));
        assert_eq!(session.trip_form().distance, "");
    }

    #[tokio::test]
    async fn test_calculate_requires_both_locations() {
        let estimator =
            DistanceEstimator::new(DirectionsConfig::new("key").with_base_url("http://127.0.0.1:1"))
                .unwrap();
        let (session, _) = session();
        let mut session = session.with_estimator(Some(estimator));
        session.trip_form_mut().start_location = "A".into();

        assert!(session.calculate_mileage().await.is_err());
        assert_eq!(
            notice_text(&session).as_deref(),
            Some("Please enter both start and end locations.")
        );
    }

    #[tokio::test]
    async fn test_calculate_network_failure_notice() {
        let estimator =
            DistanceEstimator::new(DirectionsConfig::new("key").with_base_url("http://127.0.0.1:1"))
                .unwrap();
        let (session, _) = session();
        let mut session = session.with_estimator(Some(estimator));
        session.trip_form_mut().start_location = "A".into();
        session.trip_form_mut().end_location = "B".into();

        assert!(matches!(
            session.calculate_mileage().await,
            Err(MileageError::Network(_))
        ));
        let text = notice_text(&session).unwrap();
        assert!(text.starts_with(MILEAGE_FAILED));
        assert_eq!(session.trip_form().distance, "");
    }

    #[test]
    fn test_capture_unavailable() {
        let (mut session, _) = session();
        assert!(!session.can_capture_receipt());
        assert!(session.capture_receipt().is_err());
        assert_eq!(
            notice_text(&session).as_deref(),
            Some("Camera feature is not available on this platform.")
        );
    }

    #[test]
    fn test_capture_and_cancel() {
        let (session, _) = session();
        let mut session =
            session.with_capture(ReceiptCapture::new(Some(Box::new(Canned(Some(ONE_PIXEL_PNG.to_vec()))))));
        assert!(session.capture_receipt().unwrap());
        assert_eq!(notice_text(&session).as_deref(), Some(RECEIPT_CAPTURED));
        assert!(session.expense_form().receipt.is_some());

        let (session, _) = self::session();
        let mut session = session.with_capture(ReceiptCapture::new(Some(Box::new(Canned(None)))));
        assert!(!session.capture_receipt().unwrap());
        assert_eq!(notice_text(&session).as_deref(), Some(RECEIPT_CANCELLED));
    }

    #[test]
    fn test_export_empty_ledger() {
        let (mut session, _) = session();
        let today = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        assert!(session.export(today).is_err());
        assert_eq!(notice_text(&session).as_deref(), Some("No data to export."));
    }

    #[test]
    fn test_export_success_notice() {
        let (mut session, _) = session();
        fill_trip(&mut session, "2024-05-01", "5");
        session.add_trip().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();

        let file = session.export(today).unwrap();
        assert_eq!(file.rows, 1);
        assert_eq!(notice_text(&session).as_deref(), Some(EXPORTED));
    }

    #[test]
    fn test_export_save_failure_replaces_success() {
        let (mut session, _) = session();
        fill_trip(&mut session, "2024-05-01", "5");
        session.add_trip().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();

        let result = session.export_with(today, |_| -> Result<()> {
            Err(MileageError::Export("disk full".into()))
        });

        assert!(result.is_err());
        let notice = session.notice().expect("notice should be visible");
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.text, "Export error: disk full");
        assert_eq!(session.entries().len(), 1);
    }

    #[test]
    fn test_export_with_returns_saved_value() {
        let (mut session, _) = session();
        fill_trip(&mut session, "2024-05-01", "5");
        session.add_trip().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();

        let (file, name) = session
            .export_with(today, |file| Ok(file.file_name.clone()))
            .expect("export should succeed");

        assert_eq!(name, file.file_name);
        assert_eq!(notice_text(&session).as_deref(), Some(EXPORTED));
    }
}
