use nullistant::surface::{
    EntityRef, RawEntity, Rect, Role, SurfaceProvider, SurfaceScanner, Viewport, MAX_TEXT_LEN,
};

struct FixedSurface {
    entities: Vec<RawEntity>,
}

impl SurfaceProvider for FixedSurface {
    fn viewport(&self) -> Viewport {
        Viewport {
            width: 1280.0,
            height: 800.0,
        }
    }
    fn scan(&self) -> Vec<RawEntity> {
        self.entities.clone()
    }
}

fn raw(id: u64) -> RawEntity {
    RawEntity {
        reference: EntityRef(id),
        text: "Label".to_string(),
        role: Role::Text,
        interactive_role_attr: false,
        has_click_handler: false,
        pointer_cursor: false,
        hoverable: false,
        visible: true,
        bounds: Rect {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 40.0,
        },
        emergency_styled: false,
        assistant_owned: false,
    }
}

#[test]
fn tiny_and_invisible_elements_are_filtered() {
    let mut thin = raw(1);
    thin.bounds.height = 4.0;
    let mut narrow = raw(2);
    narrow.bounds.width = 4.0;
    let mut hidden = raw(3);
    hidden.visible = false;
    let kept = raw(4);

    let scanner = SurfaceScanner::new(10.0);
    let snapshot = scanner.scan(&FixedSurface {
        entities: vec![thin, narrow, hidden, kept],
    });

    assert_eq!(snapshot.entities.len(), 1);
    assert_eq!(snapshot.entities[0].reference, EntityRef(4));
}

#[test]
fn clickability_heuristics_each_suffice() {
    let mut by_role = raw(1);
    by_role.role = Role::Button;
    let mut by_attr = raw(2);
    by_attr.interactive_role_attr = true;
    let mut by_handler = raw(3);
    by_handler.has_click_handler = true;
    let mut by_cursor = raw(4);
    by_cursor.pointer_cursor = true;
    let mut by_hover = raw(5);
    by_hover.hoverable = true;
    let plain = raw(6);

    let scanner = SurfaceScanner::new(10.0);
    let snapshot = scanner.scan(&FixedSurface {
        entities: vec![by_role, by_attr, by_handler, by_cursor, by_hover, plain],
    });

    let clickable: Vec<bool> = snapshot.entities.iter().map(|e| e.clickable).collect();
    assert_eq!(clickable, [true, true, true, true, true, false]);
}

#[test]
fn text_is_trimmed_and_truncated() {
    let mut padded = raw(1);
    padded.text = "  Go Home  ".to_string();
    let mut long = raw(2);
    long.text = "x".repeat(500);

    let scanner = SurfaceScanner::new(10.0);
    let snapshot = scanner.scan(&FixedSurface {
        entities: vec![padded, long],
    });

    assert_eq!(snapshot.entities[0].text, "Go Home");
    assert_eq!(snapshot.entities[1].text.chars().count(), MAX_TEXT_LEN);
}

#[test]
fn truncation_respects_multibyte_labels() {
    let mut glyphs = raw(1);
    glyphs.text = "←".repeat(300);

    let scanner = SurfaceScanner::new(10.0);
    let snapshot = scanner.scan(&FixedSurface {
        entities: vec![glyphs],
    });
    assert_eq!(snapshot.entities[0].text.chars().count(), MAX_TEXT_LEN);
}
