use std::time::Duration;

use callm::data::{load_answers, load_quiz, save_answers};
use callm::engine::{Outcome, QuizEngine, QuizSession};
use callm::models::{AnswerSet, Question, Quiz, QuizKind};
use tokio::sync::mpsc;

const DEBOUNCE: Duration = Duration::from_millis(600);

fn three_questions() -> Quiz {
    let questions = ["Q1", "Q2", "Q3"]
        .iter()
        .map(|id| Question {
            id: id.to_string(),
            question: format!("Question {}", id),
            options: vec!["A".into(), "B".into(), "C".into(), "newOption".into()],
            correct_answer: None,
            category: None,
        })
        .collect();
    Quiz::new(questions).unwrap()
}

fn session(engine: QuizEngine) -> (QuizSession, mpsc::UnboundedReceiver<AnswerSet>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let session = QuizSession::new(engine, DEBOUNCE, move |answers| {
        let _ = tx.send(answers);
    });
    (session, rx)
}

async fn settle() {
    tokio::time::sleep(DEBOUNCE + Duration::from_millis(50)).await;
    tokio::task::yield_now().await;
}

#[tokio::test(start_paused = true)]
async fn answering_in_order_completes_once() {
    let (session, mut rx) = session(QuizEngine::new(three_questions()));

    for option in ["A", "B", "C"] {
        session.select_answer(option).await.unwrap();
        settle().await;
    }

    let expected: AnswerSet = [("Q1", "A"), ("Q2", "B"), ("Q3", "C")].into_iter().collect();
    assert_eq!(rx.try_recv().unwrap(), expected);
    assert!(rx.try_recv().is_err());
    assert!(session.read(|e| e.is_completed()).await);
    assert_eq!(session.read(|e| e.answers().clone()).await, expected);
}

#[tokio::test(start_paused = true)]
async fn resume_then_review_and_overwrite() {
    let mut engine = QuizEngine::new(three_questions());
    engine.resume_from([("Q1", "A")].into_iter().collect());
    assert_eq!(engine.current_step(), 2);
    assert!(!engine.is_review_mode());

    let (session, mut rx) = session(engine);
    assert!(session.navigate_to(1).await);
    assert!(session.read(|e| e.is_review_mode()).await);
    assert!(!session.navigate_to(3).await);

    session.select_answer("newOption").await.unwrap();
    assert_eq!(
        session.read(|e| e.answers().get("Q1").map(String::from)).await.as_deref(),
        Some("newOption")
    );
    assert!(!session.read(|e| e.is_review_mode()).await);

    settle().await;
    assert_eq!(session.read(|e| e.current_step()).await, 2);
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn frontier_never_moves_backwards() {
    let (session, _rx) = session(QuizEngine::new(three_questions()));
    let mut frontier = session.read(|e| e.next_unanswered()).await;

    for (option, jump) in [("A", 1), ("B", 1), ("C", 2)] {
        session.select_answer(option).await.unwrap();
        session.navigate_to(jump).await;
        settle().await;

        let next = session.read(|e| e.next_unanswered()).await;
        assert!(next >= frontier);
        frontier = next;

        let step = session.read(|e| e.current_step()).await;
        assert!((1..=3).contains(&step));
    }
}

#[tokio::test(start_paused = true)]
async fn saved_progress_resumes_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let answers_path = dir.path().join("answers.json");
    let quiz = load_quiz("assets/quiz.json").unwrap();
    assert_eq!(quiz.kind(), QuizKind::Scored);

    let first = quiz.questions()[0].clone();
    let (session, _rx) = session(QuizEngine::new(quiz.clone()));
    session.select_answer(&first.options[0]).await.unwrap();
    let partial = session.read(|e| e.answers().clone()).await;
    session.close().await;
    save_answers(&answers_path, &partial).unwrap();

    let prior = load_answers(&answers_path).unwrap().unwrap();
    let mut engine = QuizEngine::new(quiz);
    engine.resume_from(prior);
    assert_eq!(engine.current_step(), 2);
    assert_eq!(engine.answers().get(&first.id), Some(first.options[0].as_str()));
}

#[tokio::test(start_paused = true)]
async fn survey_completes_with_grouped_outcome() {
    let quiz = load_quiz("assets/survey.json").unwrap();
    assert_eq!(quiz.kind(), QuizKind::Categorized);
    let total = quiz.total();
    let (session, mut rx) = session(QuizEngine::new(quiz));

    for _ in 0..total {
        let option = session
            .read(|e| e.current_question().options[1].clone())
            .await;
        session.select_answer(&option).await.unwrap();
        settle().await;
    }

    assert_eq!(rx.try_recv().unwrap().len(), total);
    let Some(Outcome::Categorized(report)) = session.read(|e| e.outcome()).await else {
        panic!("expected a categorized outcome");
    };
    let labels: Vec<_> = report.groups.iter().map(|g| g.category.as_str()).collect();
    assert_eq!(labels, ["Mood", "Social", "Sleep", "General"]);
}
