use std::sync::Arc;

use chrono::{Local, NaiveDate};
use strada_core::{
    GeoPoint, ReminderDecision, StreetSegment, classify,
    reminder::FavoriteAlert,
    service::{NearbyStreet, StradaService},
};

use crate::config::Settings;

/// How many upcoming cleanings the detail view lists.
const UPCOMING_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Locate,
    Search,
    Favorites,
    Detail,
}

impl Screen {
    /// Next screen in the Tab order. The detail view is not part of the cycle.
    pub(crate) fn next(self) -> Self {
        match self {
            Self::Locate => Self::Search,
            Self::Search => Self::Favorites,
            Self::Favorites | Self::Detail => Self::Locate,
        }
    }
}

/// One street opened in the detail view.
pub(crate) struct StreetDetail {
    pub street: StreetSegment,
    pub upcoming: Vec<NaiveDate>,
    pub decision: Option<ReminderDecision>,
}

impl StreetDetail {
    pub(crate) fn new(street: StreetSegment, today: NaiveDate, warning_days: i64) -> Self {
        let upcoming: Vec<NaiveDate> = street.rule.occurrences(today).take(UPCOMING_COUNT).collect();
        let decision = upcoming
            .first()
            .map(|next| classify(*next, today, warning_days));
        Self {
            street,
            upcoming,
            decision,
        }
    }
}

pub(crate) struct App {
    pub service: Arc<StradaService>,
    pub settings: Settings,

    pub screen: Screen,
    pub previous_screen: Screen,

    pub location_input: String,
    pub nearby: Vec<NearbyStreet>,
    pub nearby_index: usize,

    pub search_input: String,
    pub search_results: Vec<StreetSegment>,
    pub search_index: usize,
    pub best_match: Option<usize>,

    pub favorite_alerts: Vec<FavoriteAlert>,
    pub favorite_index: usize,

    pub detail: Option<StreetDetail>,

    pub is_loading: bool,
    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(service: Arc<StradaService>, settings: Settings) -> Self {
        Self {
            service,
            settings,
            screen: Screen::Locate,
            previous_screen: Screen::Locate,
            location_input: String::new(),
            nearby: Vec::new(),
            nearby_index: 0,
            search_input: String::new(),
            search_results: Vec::new(),
            search_index: 0,
            best_match: None,
            favorite_alerts: Vec::new(),
            favorite_index: 0,
            detail: None,
            is_loading: false,
            error_message: None,
        }
    }

    pub(crate) fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    pub(crate) fn next_screen(&mut self) {
        self.screen = self.screen.next();
        self.error_message = None;
    }

    pub(crate) fn back(&mut self) {
        self.screen = self.previous_screen;
        self.detail = None;
    }

    pub(crate) fn move_selection(&mut self, down: bool) {
        let (index, len) = match self.screen {
            Screen::Locate => (&mut self.nearby_index, self.nearby.len()),
            Screen::Search => (&mut self.search_index, self.search_results.len()),
            Screen::Favorites => (&mut self.favorite_index, self.favorite_alerts.len()),
            Screen::Detail => return,
        };

        if down {
            if *index + 1 < len {
                *index += 1;
            }
        } else {
            *index = index.saturating_sub(1);
        }
    }

    /// Streets near the coordinates typed on the locate screen.
    pub(crate) fn locate(&mut self) {
        let Some(point) = parse_location(&self.location_input) else {
            self.error_message =
                Some("Type a position as \"lat, lon\" in degrees, then press Enter".into());
            return;
        };

        self.nearby = self.service.nearby(
            point,
            self.settings.matching.max_distance_meters,
            Self::today(),
        );
        self.nearby_index = 0;
        self.error_message = self.nearby.is_empty().then(|| {
            format!(
                "No street within {} m of {point}",
                self.settings.matching.max_distance_meters
            )
        });
    }

    /// Segments matching the name typed on the search screen.
    pub(crate) fn search(&mut self) {
        let query = self.search_input.trim();
        if query.is_empty() {
            self.error_message = Some("Type part of a street name, then press Enter".into());
            return;
        }

        self.search_results = self.service.search(query);
        self.search_index = 0;
        let preferred = self.service.find_by_name(query, Self::today());
        self.best_match = preferred.and_then(|pick| {
            self.search_results
                .iter()
                .position(|street| *street == pick)
        });
        if let Some(best) = self.best_match {
            self.search_index = best;
        }
        self.error_message = self
            .search_results
            .is_empty()
            .then(|| format!("No street matches \"{query}\""));
    }

    pub(crate) fn load_favorites(&mut self) {
        self.favorite_alerts = self.service.favorite_alerts(
            &self.settings.favorites,
            Self::today(),
            self.settings.reminders.warning_days_advance,
        );
        self.favorite_index = 0;
    }

    /// Re-runs the queries of every screen against the current catalog.
    pub(crate) fn requery(&mut self) {
        if parse_location(&self.location_input).is_some() {
            self.locate();
        }
        if !self.search_input.trim().is_empty() {
            self.search();
        }
        self.load_favorites();
    }

    /// Opens the street selected on the current screen in the detail view.
    pub(crate) fn open_detail(&mut self) {
        let today = Self::today();
        let street = match self.screen {
            Screen::Locate => self
                .nearby
                .get(self.nearby_index)
                .map(|hit| hit.street.clone()),
            Screen::Search => self.search_results.get(self.search_index).cloned(),
            Screen::Favorites => self
                .favorite_alerts
                .get(self.favorite_index)
                .and_then(|alert| self.service.find_by_name(&alert.favorite, today)),
            Screen::Detail => return,
        };

        let Some(street) = street else {
            self.error_message = Some("Nothing selected".into());
            return;
        };

        self.detail = Some(StreetDetail::new(
            street,
            today,
            self.settings.reminders.warning_days_advance,
        ));
        self.previous_screen = self.screen;
        self.screen = Screen::Detail;
        self.error_message = None;
    }
}

/// Parses `"lat, lon"` or `"lat lon"` in decimal degrees.
pub(crate) fn parse_location(input: &str) -> Option<GeoPoint> {
    let mut parts = input
        .split(|ch: char| ch == ',' || ch.is_whitespace())
        .filter(|part| !part.is_empty());

    let lat: f64 = parts.next()?.parse().ok()?;
    let lon: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon))
        .then(|| GeoPoint::new(lat, lon))
}
