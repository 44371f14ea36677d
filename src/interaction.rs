//! Gesture logic that does not depend on how a page is delivered.
//!
//! The HTTP handlers use the filter, search and modal pieces directly. The
//! drag, navbar and entrance pieces are the reference model for the row
//! script in `base.html`, which receives its constants through
//! [`ClientTuning`].

use crate::catalogue::Catalogue;
use crate::model::Movie;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;

pub const PLAY_NOTICE: &str = "▶ Iniciando reproducción...";
pub const INFO_NOTICE: &str = "ℹ️ Más información";
pub const REGISTERED_NOTICE: &str = "Usuario registrado correctamente ✅";
pub const NO_RESULTS: &str = "No se encontraron resultados";

pub const NAVBAR_SCROLL_THRESHOLD: f64 = 50.0;
pub const FADE_IN_DELAY: Duration = Duration::from_millis(100);

pub const MOUSE_DRAG_FACTOR: f64 = 2.0;
pub const TOUCH_DRAG_FACTOR: f64 = 1.5;

/// Constants handed to the page script.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct ClientTuning {
    pub mouse_drag_factor: f64,
    pub touch_drag_factor: f64,
    pub navbar_threshold: f64,
    pub fade_in_ms: u64,
}

impl Default for ClientTuning {
    fn default() -> Self {
        ClientTuning {
            mouse_drag_factor: MOUSE_DRAG_FACTOR,
            touch_drag_factor: TOUCH_DRAG_FACTOR,
            navbar_threshold: NAVBAR_SCROLL_THRESHOLD,
            fade_in_ms: FADE_IN_DELAY.as_millis() as u64,
        }
    }
}

pub fn navbar_scrolled(scroll_y: f64) -> bool {
    scroll_y > NAVBAR_SCROLL_THRESHOLD
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Anchor {
    origin_x: f64,
    scroll_left: f64,
}

/// Drag-to-scroll state of a single movie row.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DragScroll {
    mouse: Option<Anchor>,
    touch: Option<Anchor>,
}

impl DragScroll {
    /// `x` is the pointer position relative to the row.
    pub fn mouse_down(&mut self, x: f64, scroll_left: f64) {
        self.mouse = Some(Anchor {
            origin_x: x,
            scroll_left,
        });
    }

    /// New scroll offset, or `None` when no button is held.
    pub fn mouse_move(&self, x: f64) -> Option<f64> {
        self.mouse
            .map(|anchor| anchor.scroll_left - (x - anchor.origin_x) * MOUSE_DRAG_FACTOR)
    }

    /// Mouse up and mouse leave both end the drag.
    pub fn mouse_up(&mut self) {
        self.mouse = None;
    }

    pub fn grabbing(&self) -> bool {
        self.mouse.is_some()
    }

    pub fn touch_start(&mut self, x: f64, scroll_left: f64) {
        self.touch = Some(Anchor {
            origin_x: x,
            scroll_left,
        });
    }

    pub fn touch_move(&self, x: f64) -> Option<f64> {
        self.touch
            .map(|anchor| anchor.scroll_left + (anchor.origin_x - x) * TOUCH_DRAG_FACTOR)
    }
}

/// One-shot entrance animation: every card fades in the first time it
/// becomes visible and is never observed again.
#[derive(Debug, Default)]
pub struct EntranceObserver {
    done: HashSet<String>,
}

impl EntranceObserver {
    pub fn intersect(&mut self, card: &str) -> Option<Duration> {
        if self.done.insert(card.to_owned()) {
            Some(FADE_IN_DELAY)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    Register,
    Search,
}

impl Modal {
    pub fn from_name(name: &str) -> Option<Modal> {
        match name {
            "registro" => Some(Modal::Register),
            "busqueda" => Some(Modal::Search),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Modal::Register => "registro",
            Modal::Search => "busqueda",
        }
    }
}

/// Visibility of the page modals. Opening one does not close the other.
#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Modals {
    pub register: bool,
    pub search: bool,
}

impl Modals {
    pub fn parse(name: Option<&str>) -> Modals {
        let mut modals = Modals::default();
        if let Some(modal) = name.and_then(Modal::from_name) {
            modals.show(modal);
        }
        modals
    }

    pub fn show(&mut self, modal: Modal) {
        *self.slot(modal) = true;
    }

    pub fn hide(&mut self, modal: Modal) {
        *self.slot(modal) = false;
    }

    /// Clicks inside the modal content leave it open.
    pub fn click(&mut self, modal: Modal, on_backdrop: bool) {
        if on_backdrop {
            self.hide(modal);
        }
    }

    /// Home page location that shows the modals still open.
    pub fn location(&self) -> String {
        if self.register {
            format!("/?modal={}", Modal::Register.name())
        } else if self.search {
            "/buscar".to_owned()
        } else {
            "/".to_owned()
        }
    }

    fn slot(&mut self, modal: Modal) -> &mut bool {
        match modal {
            Modal::Register => &mut self.register,
            Modal::Search => &mut self.search,
        }
    }
}

/// Single active genre filter of the browse grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    All,
    Label(String),
}

impl Filter {
    pub const ALL_LABEL: &'static str = "Todas";

    pub fn parse(label: Option<&str>) -> Filter {
        match label.map(str::trim) {
            None | Some("") => Filter::All,
            Some(label) if label == Filter::ALL_LABEL => Filter::All,
            Some(label) => Filter::Label(label.to_owned()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Filter::All => Filter::ALL_LABEL,
            Filter::Label(label) => label.as_str(),
        }
    }

    pub fn matches(&self, movie: &Movie) -> bool {
        match self {
            Filter::All => true,
            Filter::Label(label) => movie.meta().to_lowercase().contains(&label.to_lowercase()),
        }
    }

    /// Every movie paired with its visibility; nothing is dropped.
    pub fn apply<'a>(&self, movies: impl IntoIterator<Item = &'a Movie>) -> Vec<(&'a Movie, bool)> {
        movies
            .into_iter()
            .map(|movie| (movie, self.matches(movie)))
            .collect()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Empty,
    NoResults,
    Hits(Vec<SearchHit>),
}

impl SearchOutcome {
    pub fn hits(&self) -> &[SearchHit] {
        match self {
            SearchOutcome::Hits(hits) => hits,
            _ => &[],
        }
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            SearchOutcome::NoResults => Some(NO_RESULTS),
            _ => None,
        }
    }
}

pub fn select_link(movie: &Movie) -> String {
    format!("/seleccionar/{}", movie.id)
}

pub fn search(catalogue: &Catalogue, query: &str) -> SearchOutcome {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return SearchOutcome::Empty;
    }
    let hits: Vec<SearchHit> = catalogue
        .iter()
        .filter(|movie| movie.title.to_lowercase().contains(&query))
        .map(|movie| SearchHit {
            title: movie.title.to_owned(),
            link: select_link(movie),
        })
        .collect();
    if hits.is_empty() {
        SearchOutcome::NoResults
    } else {
        SearchOutcome::Hits(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_drag_scrolls_twice_the_distance() {
        let mut drag = DragScroll::default();
        assert_eq!(drag.mouse_move(10.0), None);
        drag.mouse_down(100.0, 300.0);
        assert!(drag.grabbing());
        assert_eq!(drag.mouse_move(130.0), Some(240.0));
        assert_eq!(drag.mouse_move(80.0), Some(340.0));
        drag.mouse_up();
        assert!(!drag.grabbing());
        assert_eq!(drag.mouse_move(50.0), None);
    }

    #[test]
    fn touch_drag_scrolls_one_and_a_half_times() {
        let mut drag = DragScroll::default();
        assert_eq!(drag.touch_move(10.0), None);
        drag.touch_start(200.0, 100.0);
        assert_eq!(drag.touch_move(180.0), Some(130.0));
        assert_eq!(drag.touch_move(220.0), Some(70.0));
        // mouse release does not end a touch drag
        drag.mouse_up();
        assert_eq!(drag.touch_move(200.0), Some(100.0));
    }

    #[test]
    fn navbar_threshold() {
        assert!(!navbar_scrolled(0.0));
        assert!(!navbar_scrolled(50.0));
        assert!(navbar_scrolled(50.5));
    }

    #[test]
    fn entrance_fires_once() {
        let mut observer = EntranceObserver::default();
        assert_eq!(observer.intersect("pelicula1"), Some(Duration::from_millis(100)));
        assert_eq!(observer.intersect("pelicula1"), None);
        assert_eq!(observer.intersect("pelicula2"), Some(FADE_IN_DELAY));
    }

    #[test]
    fn modals() {
        let mut modals = Modals::parse(Some("registro"));
        assert!(modals.register);
        assert!(!modals.search);
        modals.click(Modal::Register, false);
        assert!(modals.register);
        modals.show(Modal::Search);
        assert!(modals.register && modals.search);
        modals.click(Modal::Register, true);
        assert!(!modals.register);
        modals.hide(Modal::Search);
        assert_eq!(modals, Modals::default());
        assert_eq!(Modals::parse(Some("otro")), Modals::default());
        assert_eq!(Modals::parse(None), Modals::default());
    }

    #[test]
    fn modal_location() {
        let mut modals = Modals::parse(Some("registro"));
        assert_eq!(modals.location(), "/?modal=registro");
        modals.click(Modal::Register, false);
        assert_eq!(modals.location(), "/?modal=registro");
        modals.click(Modal::Register, true);
        assert_eq!(modals.location(), "/");
        assert_eq!(Modals::parse(Some("busqueda")).location(), "/buscar");
    }

    #[test]
    fn client_tuning_mirrors_model() {
        let tuning = ClientTuning::default();
        let mut drag = DragScroll::default();
        drag.mouse_down(0.0, 100.0);
        assert_eq!(drag.mouse_move(10.0), Some(100.0 - 10.0 * tuning.mouse_drag_factor));
        drag.touch_start(0.0, 100.0);
        assert_eq!(drag.touch_move(-10.0), Some(100.0 + 10.0 * tuning.touch_drag_factor));
        assert!(!navbar_scrolled(tuning.navbar_threshold));
        assert_eq!(tuning.fade_in_ms, 100);
    }

    #[test]
    fn filter_all_shows_everything() {
        let catalogue = Catalogue::builtin();
        let filter = Filter::parse(Some("Todas"));
        assert_eq!(filter, Filter::All);
        assert!(filter.apply(catalogue.iter()).iter().all(|(_, shown)| *shown));
        assert_eq!(Filter::parse(None), Filter::All);
    }

    #[test]
    fn filter_by_genre_hides_the_rest() {
        let catalogue = Catalogue::builtin();
        let filter = Filter::parse(Some("ciencia ficción"));
        let cards = filter.apply(catalogue.iter());
        assert_eq!(cards.len(), catalogue.len());
        let shown: Vec<_> = cards
            .iter()
            .filter(|(_, shown)| *shown)
            .map(|(movie, _)| movie.id)
            .collect();
        assert_eq!(shown, vec!["pelicula5", "pelicula10", "pelicula14"]);
        for (movie, shown) in cards {
            assert_eq!(shown, movie.genre == "Ciencia Ficción");
        }
    }

    #[test]
    fn filter_is_a_substring_test() {
        let catalogue = Catalogue::builtin();
        let shown = Filter::parse(Some("acc"))
            .apply(catalogue.iter())
            .into_iter()
            .filter(|(_, shown)| *shown)
            .count();
        assert_eq!(shown, 3);
    }

    #[test]
    fn empty_search_has_no_message() {
        let catalogue = Catalogue::builtin();
        let outcome = search(&catalogue, "   ");
        assert_eq!(outcome, SearchOutcome::Empty);
        assert!(outcome.hits().is_empty());
        assert_eq!(outcome.message(), None);
    }

    #[test]
    fn search_single_match() {
        let catalogue = Catalogue::builtin();
        let outcome = search(&catalogue, "  INTERES ");
        assert_eq!(
            outcome.hits(),
            &[SearchHit {
                title: "Interestelar".to_owned(),
                link: "/seleccionar/pelicula5".to_owned(),
            }]
        );
    }

    #[test]
    fn search_keeps_catalogue_order() {
        let catalogue = Catalogue::builtin();
        let titles: Vec<_> = search(&catalogue, "el")
            .hits()
            .iter()
            .map(|hit| hit.title.clone())
            .collect();
        assert_eq!(
            titles,
            vec!["El Padrino", "Interestelar", "El resplandor", "El conjuro"]
        );
    }

    #[test]
    fn search_without_match() {
        let catalogue = Catalogue::builtin();
        let outcome = search(&catalogue, "zzz");
        assert_eq!(outcome, SearchOutcome::NoResults);
        assert_eq!(outcome.message(), Some("No se encontraron resultados"));
    }
}
