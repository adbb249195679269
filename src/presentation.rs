//! Presentation sync
//!
//! Builds the widget tree for a game once, then mirrors each tick's snapshot
//! onto it: actor positions and visibility plus the score label. Read-only
//! with respect to the game.

use std::fmt::Write as _;
use std::sync::Arc;

use glam::{IVec2, UVec2};

use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::platform::{Color, Display, RectStyle, WidgetId};
use crate::sim::{Game, Snapshot};

const LABEL_POS: IVec2 = IVec2::new(5, 5);

/// Score label contents
pub fn score_text(out: &mut String, score: u32, game_over: bool) {
    out.clear();
    if game_over {
        let _ = write!(out, "Score: {score}\nGame Over!");
    } else {
        let _ = write!(out, "Score: {score}");
    }
}

pub struct Presenter {
    display: Arc<dyn Display>,
    root: WidgetId,
    label: WidgetId,
    actors: Vec<WidgetId>,
    snapshot: Snapshot,
    text: String,
}

impl Presenter {
    pub fn new<G: Game>(display: Arc<dyn Display>, game: &G) -> Self {
        let background = RectStyle::filled(
            UVec2::new(SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32),
            Color::BLACK,
        )
        .with_border(1, Color::WHITE);
        let root = display.create_rect(None, background);

        let label = display.create_label(root, "Score: 0", Color::WHITE);
        display.set_position(label, LABEL_POS);

        let actors = game
            .actor_specs()
            .into_iter()
            .map(|spec| {
                let id = display.create_rect(Some(root), spec.style);
                if !spec.initially_visible {
                    display.set_visible(id, false);
                }
                id
            })
            .collect();

        let mut presenter = Self {
            display,
            root,
            label,
            actors,
            snapshot: Snapshot::default(),
            text: String::with_capacity(32),
        };
        presenter.sync(game);
        presenter
    }

    /// Push the game's current state to the display
    pub fn sync<G: Game>(&mut self, game: &G) {
        game.snapshot_into(&mut self.snapshot);

        for (id, view) in self.actors.iter().zip(&self.snapshot.actors) {
            if view.visible {
                self.display.set_position(*id, view.pos);
            }
            self.display.set_visible(*id, view.visible);
        }

        score_text(&mut self.text, self.snapshot.score, self.snapshot.game_over);
        self.display.set_text(self.label, &self.text);
    }

    /// State as of the last `sync`
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn root(&self) -> WidgetId {
        self.root
    }

    pub fn label(&self) -> WidgetId {
        self.label
    }

    pub fn actor_widgets(&self) -> &[WidgetId] {
        &self.actors
    }
}

impl Drop for Presenter {
    fn drop(&mut self) {
        self.display.remove(self.root);
    }
}
