use markwise::testing::ScriptedClient;
use markwise::{run_grading_pipeline, Grade, GradeLetter, GradingOutcome, StageRole};

const ESSAY: &str = "The mitochondria is the powerhouse of the cell.";

fn client_with_grader(grader_output: &str) -> ScriptedClient {
    ScriptedClient::new()
        .respond(StageRole::Reader, ESSAY)
        .respond(StageRole::Grader, grader_output)
        .respond(
            StageRole::FeedbackGenerator,
            "Feedback: Accurate but very short. Expand with examples.",
        )
        .respond(
            StageRole::Justifier,
            "Grade Justification: Correct statement, minimal depth.",
        )
}

#[tokio::test]
async fn well_formed_grader_output() {
    let client = client_with_grader("Score: 92/100\nGrade: A");

    let outcome = run_grading_pipeline(&client, ESSAY).await;

    let result = outcome.result().expect("run should complete");
    assert_eq!(result.marks, Some(92));
    assert_eq!(result.grade, Some(Grade::new(GradeLetter::A)));
    assert_eq!(result.feedback, "Accurate but very short. Expand with examples.");
    assert_eq!(result.grade_justification, "Correct statement, minimal depth.");
}

#[tokio::test]
async fn reordered_grader_output() {
    let client = client_with_grader("Grade: C\nScore: 65/100");

    let outcome = run_grading_pipeline(&client, ESSAY).await;

    let result = outcome.result().expect("run should complete");
    assert_eq!(result.marks, Some(65));
    assert_eq!(result.grade, Some(Grade::new(GradeLetter::C)));
}

#[tokio::test]
async fn unrecognisable_grader_output_degrades() {
    let client = client_with_grader("A thoughtful piece, though brief.");

    let outcome = run_grading_pipeline(&client, ESSAY).await;

    let result = outcome.result().expect("run should complete");
    assert_eq!(result.marks, None);
    assert_eq!(result.grade, None);
    assert_eq!(
        result.rationale,
        "Overall assessment: N/A. See detailed feedback and justification below."
    );

    let json = serde_json::to_value(&outcome).unwrap();
    assert!(json["marks"].is_null());
    assert!(json["grade"].is_null());

    // Feedback and justification still run and see the placeholder grade
    let calls = client.calls();
    assert_eq!(calls.len(), 4);
    assert!(calls[2].message.contains("received a grade of N/A:"));
    assert!(calls[3].message.contains("this grade: N/A on"));
}

#[tokio::test]
async fn feedback_failure_returns_error_only() {
    let client = client_with_grader("Score: 92/100\nGrade: A")
        .fail_on(StageRole::FeedbackGenerator, "503 Service Unavailable");

    let outcome = run_grading_pipeline(&client, ESSAY).await;

    assert_eq!(
        outcome,
        GradingOutcome::Failed {
            error: "model invocation failed: 503 Service Unavailable".to_string()
        }
    );

    let json = serde_json::to_value(&outcome).unwrap();
    let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["error"]);

    // The justifier is never reached
    assert_eq!(
        client.roles_called(),
        vec![
            StageRole::Reader,
            StageRole::Grader,
            StageRole::FeedbackGenerator
        ]
    );
}

#[tokio::test]
async fn grader_failure_returns_error_only() {
    let client = client_with_grader("").fail_on(StageRole::Grader, "connection reset");

    let outcome = run_grading_pipeline(&client, ESSAY).await;

    assert!(outcome.result().is_none());
    assert!(outcome.error().unwrap().contains("connection reset"));
}

#[tokio::test]
async fn plus_grade_reaches_downstream_stages() {
    let client = client_with_grader("Score: 89/100\nGrade: B+");

    let outcome = run_grading_pipeline(&client, ESSAY).await;

    let result = outcome.result().expect("run should complete");
    assert_eq!(result.grade, Some(Grade::with_plus(GradeLetter::B)));
    assert!(client.calls()[3].message.contains("this grade: B+ on"));
}
