#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Arc};

    use uuid::Uuid;

    use crate::{
        config::app_config::{ExhaustionPolicy, PracticeConfig, SubmissionPolicy},
        models::{
            auth::CurrentUser,
            practice::{QuestionView, Summary},
            session::QuizSessionInfo,
        },
        service::{
            practice::{Dispense, NO_SUMMARY_NOTICE, PracticeError, PracticeService, SubjectOverview},
            session_store::SessionStore,
        },
        tests::memory_store::{
            FREE_TEXT_TYPE, MemoryExaminationStore, MemoryQuestionStore, SINGLE_CHOICE_TYPE,
        },
    };

    type MemoryPractice = PracticeService<MemoryQuestionStore, MemoryExaminationStore>;

    const SUBJECT: i64 = 1;

    fn service_with(questions: MemoryQuestionStore, config: PracticeConfig) -> MemoryPractice {
        PracticeService::new(
            questions,
            MemoryExaminationStore::default(),
            SessionStore::from_idle_timeout(600),
            config,
        )
    }

    fn service(questions: MemoryQuestionStore) -> MemoryPractice {
        service_with(questions, PracticeConfig::default())
    }

    fn student() -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            given_name: Some("Grace".into()),
            family_name: Some("Hopper".into()),
        }
    }

    async fn session(service: &MemoryPractice, user_id: Uuid) -> QuizSessionInfo {
        service.sessions().get_quiz(user_id).await.unwrap()
    }

    async fn next_question(service: &MemoryPractice, user_id: Uuid) -> QuestionView {
        match service.dispense(user_id).await.unwrap() {
            Dispense::Question(view) => view,
            other => panic!("Expected a question, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn quota_is_capped_by_dispensable_questions() {
        let questions = MemoryQuestionStore::with_subject(SUBJECT, 4);
        questions
            .add_question(1_901, 100, FREE_TEXT_TYPE, true, &[], &[])
            .add_question(1_902, 100, SINGLE_CHOICE_TYPE, false, &[1], &[1]);
        let service = service(questions);
        let user = Uuid::new_v4();

        let info = service.select_subject(user, SUBJECT, 10).await.unwrap();
        assert_eq!(info.remaining_quantity(), 4);

        let info = service.select_subject(user, SUBJECT, 2).await.unwrap();
        assert_eq!(info.remaining_quantity(), 2);
    }

    #[tokio::test]
    async fn dispensing_never_repeats_and_spends_one_per_draw() {
        let questions = MemoryQuestionStore::with_subject(SUBJECT, 6);
        questions
            .add_question(1_901, 100, FREE_TEXT_TYPE, true, &[], &[])
            .add_question(1_902, 100, SINGLE_CHOICE_TYPE, false, &[1], &[1]);
        let service = service(questions);
        let user = Uuid::new_v4();

        service.select_subject(user, SUBJECT, 6).await.unwrap();

        for step in 1..=6_u32 {
            let before = session(&service, user).await;
            let view = next_question(&service, user).await;
            let after = session(&service, user).await;

            assert_eq!(after.remaining_quantity(), before.remaining_quantity() - 1);
            assert_eq!(after.served_question_ids().len(), step as usize);
            assert_eq!(after.last_served(), Some(view.question.id));
            assert_eq!(view.question_options.len(), 3);
            assert!(view.correct_answers.is_empty());
            assert!(view.student_answer.is_empty());
            assert_ne!(view.question.id, 1_901, "free text question was dispensed");
            assert_ne!(view.question.id, 1_902, "inactive question was dispensed");
        }

        let served: HashSet<i64> = session(&service, user)
            .await
            .served_question_ids()
            .iter()
            .copied()
            .collect();
        assert_eq!(served.len(), 6);

        assert!(matches!(
            service.dispense(user).await.unwrap(),
            Dispense::Summary
        ));
    }

    #[tokio::test]
    async fn end_to_end_scores_all_but_the_last_served_question() {
        let questions = MemoryQuestionStore::with_subject(SUBJECT, 5);
        let service = service(questions.clone());
        let user = Uuid::new_v4();

        let info = service.select_subject(user, SUBJECT, 3).await.unwrap();
        assert_eq!(info.remaining_quantity(), 3);

        for _ in 0..3 {
            let view = next_question(&service, user).await;
            let correct = questions.correct_of(view.question.id);
            service
                .submit_answers(user, view.question.id, &correct)
                .await
                .unwrap();
        }

        let info = session(&service, user).await;
        assert_eq!(info.remaining_quantity(), 0);

        let Summary::Scored {
            subject,
            total_questions,
            right_answer,
            wrong_answer,
        } = service.summary(user).await.unwrap()
        else {
            panic!("Expected a scored summary");
        };

        // The final draw is excluded from scoring even though it was answered.
        let scored: Vec<i64> = total_questions.iter().map(|q| q.question.id).collect();
        assert_eq!(scored, info.served_question_ids()[..2].to_vec());
        assert_eq!((right_answer, wrong_answer), (2, 0));
        assert_eq!(subject.map(|s| s.id), Some(SUBJECT));
        assert!(total_questions.iter().all(|q| q.is_correct_answer));
    }

    #[tokio::test]
    async fn answer_order_does_not_affect_scoring() {
        let questions = MemoryQuestionStore::default();
        questions
            .add_subject(SUBJECT, "Chemistry")
            .add_template(100, SUBJECT)
            .add_question(10, 100, SINGLE_CHOICE_TYPE, true, &[1, 2, 3], &[1, 2])
            .add_question(20, 100, SINGLE_CHOICE_TYPE, true, &[4, 5], &[4]);
        let service = service(questions);
        let user = Uuid::new_v4();

        service.select_subject(user, SUBJECT, 2).await.unwrap();
        next_question(&service, user).await;
        next_question(&service, user).await;

        let first = session(&service, user).await.served_question_ids()[0];
        let chosen: Vec<i64> = if first == 10 { vec![2, 1] } else { vec![4] };
        service.submit_answers(user, first, &chosen).await.unwrap();

        let Summary::Scored {
            total_questions,
            right_answer,
            ..
        } = service.summary(user).await.unwrap()
        else {
            panic!("Expected a scored summary");
        };

        assert_eq!(right_answer, 1);
        assert_eq!(total_questions[0].student_answer, chosen);
    }

    #[tokio::test]
    async fn wrong_and_unanswered_questions_count_as_wrong() {
        let questions = MemoryQuestionStore::with_subject(SUBJECT, 4);
        let service = service(questions);
        let user = Uuid::new_v4();

        service.select_subject(user, SUBJECT, 4).await.unwrap();
        let first = next_question(&service, user).await;
        next_question(&service, user).await;
        next_question(&service, user).await;
        next_question(&service, user).await;

        // Second option is never correct in the fixture.
        let wrong = first.question_options[1].id;
        service
            .submit_answers(user, first.question.id, &[wrong])
            .await
            .unwrap();

        let Summary::Scored {
            total_questions,
            right_answer,
            wrong_answer,
            ..
        } = service.summary(user).await.unwrap()
        else {
            panic!("Expected a scored summary");
        };

        assert_eq!(total_questions.len(), 3);
        assert_eq!((right_answer, wrong_answer), (0, 3));
        assert_eq!(total_questions[0].original_answer, vec![first.question.id * 10 + 1]);
    }

    #[tokio::test]
    async fn subject_without_template_is_an_empty_quiz() {
        let questions = MemoryQuestionStore::default();
        questions.add_subject(SUBJECT, "History");
        let service = service(questions);
        let user = Uuid::new_v4();

        let info = service.select_subject(user, SUBJECT, 5).await.unwrap();
        assert_eq!(info.remaining_quantity(), 0);

        assert!(matches!(
            service.dispense(user).await.unwrap(),
            Dispense::Summary
        ));

        let Summary::Scored {
            total_questions,
            right_answer,
            wrong_answer,
            ..
        } = service.summary(user).await.unwrap()
        else {
            panic!("Expected a scored summary");
        };
        assert!(total_questions.is_empty());
        assert_eq!((right_answer, wrong_answer), (0, 0));
    }

    #[tokio::test]
    async fn dispensing_without_session_routes_to_subject_selection() {
        let service = service(MemoryQuestionStore::with_subject(SUBJECT, 3));
        let user = Uuid::new_v4();

        assert!(matches!(
            service.dispense(user).await.unwrap(),
            Dispense::SelectSubject
        ));
        assert!(service.sessions().get_quiz(user).await.is_none());
    }

    #[tokio::test]
    async fn restart_is_repeatable_and_leaves_a_farewell() {
        let service = service(MemoryQuestionStore::with_subject(SUBJECT, 3));
        let user = student();

        service.select_subject(user.id, SUBJECT, 2).await.unwrap();
        next_question(&service, user.id).await;

        for _ in 0..2 {
            let farewell = service.restart(&user).await;
            assert_eq!(farewell, "Thank you Grace Hopper, Have a good day.");
            assert!(matches!(
                service.dispense(user.id).await.unwrap(),
                Dispense::SelectSubject
            ));
        }

        let SubjectOverview::Subjects { subjects, flash } =
            service.subject_overview(user.id).await.unwrap()
        else {
            panic!("Expected the subject list");
        };
        assert_eq!(subjects.len(), 1);
        assert_eq!(flash.as_deref(), Some("Thank you Grace Hopper, Have a good day."));

        let SubjectOverview::Subjects { flash, .. } =
            service.subject_overview(user.id).await.unwrap()
        else {
            panic!("Expected the subject list");
        };
        assert_eq!(flash, None);
    }

    #[tokio::test]
    async fn running_attempt_resumes_from_subject_page() {
        let service = service(MemoryQuestionStore::with_subject(SUBJECT, 3));
        let user = Uuid::new_v4();

        service.select_subject(user, SUBJECT, 2).await.unwrap();

        assert!(matches!(
            service.subject_overview(user).await.unwrap(),
            SubjectOverview::Resume
        ));
    }

    #[tokio::test]
    async fn finishing_early_scores_what_was_served() {
        let service = service(MemoryQuestionStore::with_subject(SUBJECT, 5));
        let user = Uuid::new_v4();

        service.select_subject(user, SUBJECT, 4).await.unwrap();
        next_question(&service, user).await;
        next_question(&service, user).await;
        assert_eq!(session(&service, user).await.remaining_quantity(), 2);

        service.finish(user).await;
        let info = session(&service, user).await;
        assert_eq!(info.remaining_quantity(), 0);
        assert_eq!(info.served_question_ids().len(), 2);

        let Summary::Scored {
            total_questions, ..
        } = service.summary(user).await.unwrap()
        else {
            panic!("Expected a scored summary");
        };
        assert_eq!(total_questions.len(), 1);
        assert_eq!(total_questions[0].question.id, info.served_question_ids()[0]);
    }

    #[tokio::test]
    async fn finish_without_session_is_a_no_op() {
        let service = service(MemoryQuestionStore::with_subject(SUBJECT, 5));
        let user = Uuid::new_v4();

        service.finish(user).await;

        assert!(service.sessions().get_quiz(user).await.is_none());
        assert!(matches!(
            service.summary(user).await.unwrap(),
            Summary::Unavailable { .. }
        ));
    }

    #[tokio::test]
    async fn premature_summary_is_unavailable() {
        let service = service(MemoryQuestionStore::with_subject(SUBJECT, 5));
        let user = Uuid::new_v4();

        service.select_subject(user, SUBJECT, 3).await.unwrap();
        next_question(&service, user).await;

        let Summary::Unavailable { notice } = service.summary(user).await.unwrap() else {
            panic!("Summary should not be available yet");
        };
        assert_eq!(notice, NO_SUMMARY_NOTICE);
    }

    #[tokio::test]
    async fn selecting_again_replaces_the_session() {
        let questions = MemoryQuestionStore::with_subject(SUBJECT, 5);
        questions
            .add_subject(2, "Physics")
            .add_template(200, 2)
            .add_question(2_001, 200, SINGLE_CHOICE_TYPE, true, &[1], &[1]);
        let examinations = MemoryExaminationStore::default();
        let service = PracticeService::new(
            questions,
            examinations.clone(),
            SessionStore::from_idle_timeout(600),
            PracticeConfig::default(),
        );
        let user = Uuid::new_v4();

        let first = service.select_subject(user, SUBJECT, 3).await.unwrap();
        next_question(&service, user).await;

        let second = service.select_subject(user, 2, 3).await.unwrap();
        let info = session(&service, user).await;

        assert_ne!(first.examination_id(), second.examination_id());
        assert_eq!(info, second);
        assert_eq!(info.subject_id(), 2);
        assert_eq!(info.remaining_quantity(), 1);
        assert!(info.served_question_ids().is_empty());
        assert_eq!(examinations.examination_count(), 2);
    }

    #[tokio::test]
    async fn answers_are_stored_per_chosen_option() {
        let questions = MemoryQuestionStore::with_subject(SUBJECT, 3);
        let examinations = MemoryExaminationStore::default();
        let service = PracticeService::new(
            questions,
            examinations.clone(),
            SessionStore::from_idle_timeout(600),
            PracticeConfig::default(),
        );
        let user = Uuid::new_v4();

        let info = service.select_subject(user, SUBJECT, 2).await.unwrap();
        let view = next_question(&service, user).await;
        let chosen: Vec<i64> = view.question_options.iter().map(|o| o.id).collect();

        let recorded = service
            .submit_answers(user, view.question.id, &chosen)
            .await
            .unwrap();

        let stored = examinations.answers_of(info.examination_id());
        assert_eq!(recorded, 3);
        assert_eq!(stored.len(), 3);
        assert!(stored.iter().all(|a| a.answer && a.question_id == view.question.id));
    }

    #[tokio::test]
    async fn lenient_policy_accepts_any_question_id() {
        let service = service(MemoryQuestionStore::with_subject(SUBJECT, 3));
        let user = Uuid::new_v4();

        service.select_subject(user, SUBJECT, 2).await.unwrap();
        next_question(&service, user).await;

        assert_eq!(service.submit_answers(user, 999, &[1]).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn last_served_policy_rejects_other_questions() {
        let config = PracticeConfig {
            submission_policy: SubmissionPolicy::LastServed,
            ..PracticeConfig::default()
        };
        let service = service_with(MemoryQuestionStore::with_subject(SUBJECT, 3), config);
        let user = Uuid::new_v4();

        service.select_subject(user, SUBJECT, 2).await.unwrap();
        let view = next_question(&service, user).await;

        let result = service.submit_answers(user, 999, &[1]).await;
        assert!(matches!(
            result,
            Err(PracticeError::SubmissionMismatch { expected: Some(id), received: 999 }) if id == view.question.id
        ));

        assert!(
            service
                .submit_answers(user, view.question.id, &[1])
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn submitting_without_session_is_rejected() {
        let service = service(MemoryQuestionStore::with_subject(SUBJECT, 3));

        let result = service.submit_answers(Uuid::new_v4(), 1, &[1]).await;
        assert!(matches!(result, Err(PracticeError::NoActiveSession)));
    }

    #[tokio::test]
    async fn missing_examination_is_reported() {
        let examinations = MemoryExaminationStore::default();
        let service = PracticeService::new(
            MemoryQuestionStore::with_subject(SUBJECT, 3),
            examinations.clone(),
            SessionStore::from_idle_timeout(600),
            PracticeConfig::default(),
        );
        let user = Uuid::new_v4();

        let info = service.select_subject(user, SUBJECT, 1).await.unwrap();
        let view = next_question(&service, user).await;
        examinations.purge();

        let result = service.submit_answers(user, view.question.id, &[1]).await;
        assert!(matches!(
            result,
            Err(PracticeError::ExaminationMissing(id)) if id == info.examination_id()
        ));
        assert!(matches!(
            service.summary(user).await,
            Err(PracticeError::ExaminationMissing(_))
        ));
    }

    #[tokio::test]
    async fn exhausted_store_finishes_attempt_early() {
        let questions = MemoryQuestionStore::with_subject(SUBJECT, 3);
        let service = service(questions.clone());
        let user = Uuid::new_v4();

        service.select_subject(user, SUBJECT, 3).await.unwrap();
        next_question(&service, user).await;
        questions.deactivate_all();

        assert!(matches!(
            service.dispense(user).await.unwrap(),
            Dispense::DrawExhausted { subject_id: SUBJECT }
        ));

        let info = session(&service, user).await;
        assert_eq!(info.remaining_quantity(), 0);
        assert_eq!(info.served_question_ids().len(), 1);
        assert!(matches!(
            service.dispense(user).await.unwrap(),
            Dispense::Summary
        ));
    }

    #[tokio::test]
    async fn exhausted_store_faults_when_configured() {
        let questions = MemoryQuestionStore::with_subject(SUBJECT, 3);
        let config = PracticeConfig {
            exhaustion_policy: ExhaustionPolicy::Fault,
            ..PracticeConfig::default()
        };
        let service = service_with(questions.clone(), config);
        let user = Uuid::new_v4();

        service.select_subject(user, SUBJECT, 3).await.unwrap();
        questions.deactivate_all();

        assert!(matches!(
            service.dispense(user).await,
            Err(PracticeError::NoQualifyingQuestion { subject_id: SUBJECT })
        ));
        assert_eq!(session(&service, user).await.remaining_quantity(), 3);
    }

    #[tokio::test]
    async fn concurrent_dispenses_do_not_corrupt_the_session() {
        let questions = MemoryQuestionStore::with_subject(SUBJECT, 8);
        let service = Arc::new(service(questions.clone()));
        let user = Uuid::new_v4();

        service.select_subject(user, SUBJECT, 5).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.dispense(user).await })
            })
            .collect();

        let results = futures::future::join_all(handles).await;
        let served_views = results
            .into_iter()
            .map(|result| result.unwrap().unwrap())
            .filter(|outcome| matches!(outcome, Dispense::Question(_)))
            .count();

        let info = session(&service, user).await;
        let unique: HashSet<i64> = info.served_question_ids().iter().copied().collect();

        assert_eq!(served_views, 5);
        assert_eq!(info.remaining_quantity(), 0);
        assert_eq!(unique.len(), 5);
        assert!(unique.iter().all(|id| questions.question(*id).is_some()));
    }
}
