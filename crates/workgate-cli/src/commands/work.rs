use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;
use serde_json::json;
use workgate_core::storage::Database;
use workgate_core::{format_hms, Config, Session, ValidationError, WorkDraft};

use super::print_json;

#[derive(Subcommand)]
pub enum WorkAction {
    /// Validate a work draft and print the form payload with the recorded time
    Payload {
        /// Work title
        #[arg(long)]
        title: String,
        /// Work description
        #[arg(long)]
        body: String,
        /// Photo file; the first is required, up to three
        #[arg(long = "photo")]
        photos: Vec<PathBuf>,
    },
}

fn draft_from(
    title: String,
    body: String,
    photos: Vec<PathBuf>,
) -> Result<WorkDraft, ValidationError> {
    if photos.len() > 3 {
        return Err(ValidationError::InvalidValue {
            field: "photo".into(),
            message: format!("at most 3 photos, got {}", photos.len()),
        });
    }
    let mut photos = photos.into_iter();
    Ok(WorkDraft {
        title,
        body,
        photo1: photos.next(),
        photo2: photos.next(),
        photo3: photos.next(),
    })
}

pub fn run(action: WorkAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        WorkAction::Payload {
            title,
            body,
            photos,
        } => {
            let config = Config::load()?;
            let db = Database::open()?;
            let mut session = Session::mount(&db, &config);

            let draft = draft_from(title, body, photos)?;
            let (submission, _) = session.begin_submission(draft, Utc::now())?;
            let payload = json!({
                "recorded_time": format_hms(submission.recorded_secs),
                "fields": submission.form_fields(),
            });
            print_json(&payload)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photos_fill_slots_in_order() {
        let draft = draft_from(
            "t".into(),
            "b".into(),
            vec!["a.png".into(), "b.png".into()],
        )
        .unwrap();
        assert_eq!(draft.photo1, Some(PathBuf::from("a.png")));
        assert_eq!(draft.photo2, Some(PathBuf::from("b.png")));
        assert_eq!(draft.photo3, None);
    }

    #[test]
    fn more_than_three_photos_rejected() {
        let photos = (0..4).map(|i| PathBuf::from(format!("{i}.png"))).collect();
        assert!(matches!(
            draft_from("t".into(), "b".into(), photos),
            Err(ValidationError::InvalidValue { .. })
        ));
    }
}
