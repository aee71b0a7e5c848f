use nullistant::config::ScoringWeights;
use nullistant::error::EngineError;
use nullistant::intent::{IntentAnalysis, IntentCategory, IntentClassifier, Urgency};
use nullistant::resolver::TargetResolver;
use nullistant::surface::{
    EntityRef, Rect, Role, SurfaceSnapshot, TargetableEntity, Viewport,
};

fn entity(id: u64, text: &str) -> TargetableEntity {
    TargetableEntity {
        reference: EntityRef(id),
        text: text.to_string(),
        role: Role::Button,
        clickable: true,
        bounds: Rect {
            x: 20.0,
            y: 20.0,
            width: 160.0,
            height: 48.0,
        },
        emergency_styled: false,
        assistant_owned: false,
    }
}

fn snapshot(entities: Vec<TargetableEntity>) -> SurfaceSnapshot {
    SurfaceSnapshot {
        viewport: Viewport {
            width: 1280.0,
            height: 800.0,
        },
        entities,
    }
}

fn resolver() -> TargetResolver {
    TargetResolver::new(ScoringWeights::default(), vec!["nullistant".to_string()])
}

#[test]
fn go_back_accepts_back_to_menu_button() {
    let classifier = IntentClassifier::new();
    let analysis = classifier.classify("go back");
    let snap = snapshot(vec![entity(1, "← Back to Menu")]);

    let resolution = resolver()
        .resolve(&analysis, "go back", &snap)
        .expect("must resolve");
    assert!(
        resolution.candidate.score >= 1.2,
        "navigation bonuses must carry the score, got {}",
        resolution.candidate.score
    );
    assert_eq!(resolution.candidate.entity.reference, EntityRef(1));
    assert_eq!(resolution.confidence, 100, "confidence caps at 100");
}

#[test]
fn below_threshold_reports_failure_not_low_confidence_success() {
    let analysis = IntentAnalysis {
        category: IntentCategory::Action,
        keywords: vec!["frobnicate".into()],
        urgency: Urgency::Low,
        target_words: vec!["frobnicate".into()],
    };
    // Only the button-role bonus (+0.3) applies: 0.3 <= 0.4.
    let mut e = entity(1, "Unrelated label");
    e.bounds = Rect {
        x: 20.0,
        y: 20.0,
        width: 50.0,
        height: 30.0,
    };
    let snap = snapshot(vec![e]);

    let result = resolver().resolve(&analysis, "frobnicate", &snap);
    assert!(matches!(result, Err(EngineError::NoTargetFound { .. })));
}

#[test]
fn non_clickable_entities_never_win() {
    let classifier = IntentClassifier::new();
    let analysis = classifier.classify("go back");
    let mut perfect = entity(1, "← Back to Menu");
    perfect.clickable = false;
    let snap = snapshot(vec![perfect]);

    let result = resolver().resolve(&analysis, "go back", &snap);
    assert!(matches!(result, Err(EngineError::NoTargetFound { .. })));
}

#[test]
fn navigation_excludes_assistants_own_ui() {
    let classifier = IntentClassifier::new();
    let analysis = classifier.classify("go back");
    // Would out-score the page's button if it were eligible.
    let own_ui = entity(1, "nullistant – close and go back to menu");
    let page = entity(2, "Back");
    let snap = snapshot(vec![own_ui, page]);

    let resolution = resolver()
        .resolve(&analysis, "go back", &snap)
        .expect("page button must win");
    assert_eq!(resolution.candidate.entity.reference, EntityRef(2));
}

#[test]
fn navigation_with_only_assistant_ui_fails() {
    let classifier = IntentClassifier::new();
    let analysis = classifier.classify("go back");
    let snap = snapshot(vec![entity(1, "Nullistant panel – Back to Menu")]);

    let result = resolver().resolve(&analysis, "go back", &snap);
    assert!(matches!(result, Err(EngineError::NoTargetFound { .. })));
}

#[test]
fn assistant_owned_flag_excludes_like_text_marker() {
    let classifier = IntentClassifier::new();
    let analysis = classifier.classify("go back");
    let mut own = entity(1, "Back to Menu");
    own.assistant_owned = true;
    let page = entity(2, "Back");
    let snap = snapshot(vec![own, page]);

    let resolution = resolver().resolve(&analysis, "go back", &snap).unwrap();
    assert_eq!(resolution.candidate.entity.reference, EntityRef(2));
}

#[test]
fn score_is_monotonic_in_target_word_matches() {
    let one = IntentAnalysis {
        category: IntentCategory::Action,
        keywords: vec![],
        urgency: Urgency::Low,
        target_words: vec!["alpha".into()],
    };
    let two = IntentAnalysis {
        category: IntentCategory::Action,
        keywords: vec![],
        urgency: Urgency::Low,
        target_words: vec!["alpha".into(), "beta".into()],
    };
    let snap = snapshot(vec![entity(1, "alpha beta gamma")]);
    let r = resolver();

    let s1 = r.resolve(&one, "alpha", &snap).unwrap().candidate.score;
    let s2 = r.resolve(&two, "alpha beta", &snap).unwrap().candidate.score;
    assert!(s2 >= s1, "more matched target words must never lower the score");
}

#[test]
fn ties_break_by_scan_order() {
    let classifier = IntentClassifier::new();
    let analysis = classifier.classify("close");
    let snap = snapshot(vec![entity(7, "Close"), entity(8, "Close")]);

    let resolution = resolver().resolve(&analysis, "close", &snap).unwrap();
    assert_eq!(
        resolution.candidate.entity.reference,
        EntityRef(7),
        "first-seen candidate wins an exact tie"
    );
}

#[test]
fn emergency_bonuses_stack() {
    let classifier = IntentClassifier::new();
    let analysis = classifier.classify("emergency help");
    let mut styled = entity(1, "Emergency – Call 911");
    styled.emergency_styled = true;
    let plain = entity(2, "Emergency exit info");
    let snap = snapshot(vec![plain, styled.clone()]);

    let resolution = resolver()
        .resolve(&analysis, "emergency help", &snap)
        .unwrap();
    assert_eq!(resolution.candidate.entity.reference, styled.reference);
}

#[test]
fn close_glyph_gets_navigation_bonus() {
    let classifier = IntentClassifier::new();
    let analysis = classifier.classify("close this window");
    let glyph = entity(1, "×");
    let snap = snapshot(vec![glyph]);

    let resolution = resolver()
        .resolve(&analysis, "close this window", &snap)
        .unwrap();
    assert!(resolution.candidate.score >= 1.3);
}

#[test]
fn reasons_explain_the_score() {
    let classifier = IntentClassifier::new();
    let analysis = classifier.classify("go back");
    let snap = snapshot(vec![entity(1, "← Back to Menu")]);

    let resolution = resolver().resolve(&analysis, "go back", &snap).unwrap();
    assert!(!resolution.candidate.reasons.is_empty());
    assert!(resolution
        .candidate
        .reasons
        .iter()
        .any(|r| r.contains("back to menu")));
}
