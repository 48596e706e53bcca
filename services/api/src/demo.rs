use crate::cli::parse_backend;
use crate::infra::open_store;
use chrono::{Local, NaiveDate};
use clap::Args;
use internship_registry::config::{StorageConfig, StoreBackend};
use internship_registry::error::AppError;
use internship_registry::registry::{
    Application, CoordinatorDashboard, InternshipRegistry, Posting, PostingDraft, RegistryError,
    RegistryStore, ReviewDecision, StudentDashboard, UserId,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Store backend used for the walkthrough (memory or file)
    #[arg(long, value_parser = parse_backend, default_value = "memory")]
    pub(crate) store: StoreBackend,
    /// Document path for the file backend
    #[arg(long, default_value = "internships-demo.json")]
    pub(crate) store_path: PathBuf,
    /// Deadline for the demo posting (YYYY-MM-DD). Defaults to 30 days from today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) deadline: Option<NaiveDate>,
    /// Print the walkthrough as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Everything the walkthrough produced, in the order it happened.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DemoReport {
    pub(crate) posting: Posting,
    pub(crate) application: Application,
    pub(crate) duplicate_rejection: String,
    pub(crate) reviewed: Application,
    pub(crate) second_review_rejection: String,
    pub(crate) coordinator_dashboard: CoordinatorDashboard,
    pub(crate) student_dashboard: StudentDashboard,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        store,
        store_path,
        deadline,
        json,
    } = args;

    let deadline =
        deadline.unwrap_or_else(|| Local::now().date_naive() + chrono::Duration::days(30));
    let store = open_store(&StorageConfig {
        backend: store,
        path: store_path,
    })?;
    let registry = InternshipRegistry::new(store);

    let report = walkthrough(&registry, deadline)?;
    if json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
        println!("{rendered}");
    } else {
        render_report(&report);
    }
    Ok(())
}

pub(crate) fn walkthrough<S>(
    registry: &InternshipRegistry<S>,
    deadline: NaiveDate,
) -> Result<DemoReport, AppError>
where
    S: RegistryStore + ?Sized + 'static,
{
    let coordinator = UserId::new("coord-demo");
    let student = UserId::new("student-demo");

    let posting = registry.create_posting(
        &coordinator,
        PostingDraft {
            title: "Backend Intern".to_string(),
            organization: "Acme".to_string(),
            department: "CSE".to_string(),
            description: "Build internal APIs alongside the platform team".to_string(),
            open_positions: 2,
            deadline,
        },
    )?;

    let application = registry.submit_application(&student, &posting.id)?;
    let duplicate_rejection = expect_rejection(registry.submit_application(&student, &posting.id))?;

    let reviewed =
        registry.review_application(&coordinator, &application.id, ReviewDecision::Approved)?;
    let second_review_rejection = expect_rejection(registry.review_application(
        &coordinator,
        &application.id,
        ReviewDecision::Rejected,
    ))?;

    Ok(DemoReport {
        coordinator_dashboard: registry.coordinator_dashboard(&coordinator)?,
        student_dashboard: registry.student_dashboard(&student)?,
        posting,
        application,
        duplicate_rejection,
        reviewed,
        second_review_rejection,
    })
}

/// The walkthrough deliberately repeats operations the registry must refuse.
fn expect_rejection<T>(result: Result<T, RegistryError>) -> Result<String, AppError> {
    match result {
        Ok(_) => Err(AppError::Io(std::io::Error::other(
            "registry accepted an operation it should have refused",
        ))),
        Err(err @ RegistryError::Store(_)) => Err(err.into()),
        Err(err) => Ok(format!("{} ({})", err, err.kind())),
    }
}

fn render_report(report: &DemoReport) {
    let posting = &report.posting;
    println!("Internship portal demo");
    println!(
        "\n1. Coordinator {} opened posting {}",
        posting.owner_id, posting.id
    );
    println!(
        "   {} at {} ({}), {} position(s), deadline {}",
        posting.title,
        posting.organization,
        posting.department,
        posting.open_positions,
        posting.deadline
    );
    println!(
        "2. Student {} applied: application {} is {}",
        report.application.applicant_id, report.application.id, report.application.status
    );
    println!(
        "3. Second submission refused: {}",
        report.duplicate_rejection
    );
    println!(
        "4. Application reviewed: {} at {}",
        report.reviewed.status,
        report
            .reviewed
            .reviewed_at
            .map(|at| at.to_rfc3339())
            .unwrap_or_default()
    );
    println!(
        "5. Second review refused: {}",
        report.second_review_rejection
    );

    let coordinator = &report.coordinator_dashboard;
    println!(
        "\nCoordinator dashboard: {} posting(s), {} open, {} application(s) ({} pending, {} approved, {} rejected)",
        coordinator.postings,
        coordinator.open_postings,
        coordinator.applications.total,
        coordinator.applications.pending,
        coordinator.applications.approved,
        coordinator.applications.rejected
    );
    let student = &report.student_dashboard;
    println!(
        "Student dashboard: {} open posting(s), {} application(s), {} approved",
        student.open_postings, student.applications.total, student.applications.approved
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use internship_registry::registry::{ApplicationStatus, InMemoryStore};
    use std::sync::Arc;

    fn deadline() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid deadline")
    }

    #[test]
    fn walkthrough_records_each_step() {
        let registry = InternshipRegistry::new(Arc::new(InMemoryStore::new()));

        let report = walkthrough(&registry, deadline()).expect("walkthrough completes");

        assert_eq!(report.posting.deadline, deadline());
        assert_eq!(report.application.status, ApplicationStatus::Pending);
        assert_eq!(report.reviewed.status, ApplicationStatus::Approved);
        assert!(report.duplicate_rejection.contains("duplicate"));
        assert!(report.second_review_rejection.contains("already approved"));
        assert_eq!(report.coordinator_dashboard.applications.approved, 1);
        assert_eq!(report.student_dashboard.applications.total, 1);
    }

    #[test]
    fn walkthrough_persists_to_file_backend() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("demo.json");
        let store = open_store(&StorageConfig {
            backend: StoreBackend::File,
            path: path.clone(),
        })
        .expect("store opens");

        walkthrough(&InternshipRegistry::new(store), deadline()).expect("walkthrough completes");

        let raw = std::fs::read_to_string(&path).expect("document written");
        assert!(raw.contains("\"approved\""));
    }

    #[test]
    fn report_serializes_camel_case() {
        let registry = InternshipRegistry::new(Arc::new(InMemoryStore::new()));
        let report = walkthrough(&registry, deadline()).expect("walkthrough completes");

        let value = serde_json::to_value(&report).expect("serializes");
        assert!(value["duplicateRejection"].is_string());
        assert_eq!(value["coordinatorDashboard"]["openPostings"], 1);
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("2025-13-40").is_err());
        assert_eq!(parse_date(" 2025-06-01 "), Ok(deadline()));
    }
}
