//! Mode/session controller.
//!
//! A [`Session`] owns one logical weather query at a time: the active
//! provider, its API key, and the results of the last run. `start` runs
//! the fetch+reduce pipeline in place; `start_background` schedules it on
//! a tokio task and fires a completion callback exactly once.
//!
//! Sessions are single-flight: a second `start` while one is in flight
//! fails fast with [`Error::Busy`]. There is no cancellation — `stop`
//! only drops the stored callback, and in-flight work runs to completion
//! with its result discarded (fire and forget).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Local;
use serde_json::Value;
use tracing::info;

use crate::error::{ConfigError, Error};
use crate::fetch::{Fetch, HttpFetcher};
use crate::model::{Query, ReducedReport};
use crate::provider::{ProviderId, WeatherProvider, make_provider};
use crate::reduce;

type Callback = Box<dyn FnOnce(Result<ReducedReport, Error>) + Send + 'static>;

/// Observable lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Unconfigured,
    Ready(ProviderId),
    Fetching,
    Reduced,
    Failed,
}

#[derive(Default)]
struct Inner {
    raw: Option<Value>,
    reduced: Option<ReducedReport>,
    last_error: Option<String>,
    callback: Option<Callback>,
}

pub struct Session {
    fetcher: Arc<dyn Fetch>,
    mode: Option<ProviderId>,
    api_key: Option<String>,
    in_flight: Arc<AtomicBool>,
    inner: Arc<Mutex<Inner>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.mode)
            .field("in_flight", &self.in_flight.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Releases the single-flight slot, also on panic/early return.
struct FlightGuard(Arc<AtomicBool>);

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

async fn run_pipeline(
    provider: &dyn WeatherProvider,
    fetcher: &dyn Fetch,
    query: &Query,
) -> Result<(Value, ReducedReport), Error> {
    let raw = provider.fetch(fetcher, query).await?;
    let report = reduce::reduce(provider.id(), &raw, query, Local::now())?;
    Ok((raw, report))
}

impl Session {
    pub fn new() -> Self {
        Self::with_fetcher(Arc::new(HttpFetcher::new()))
    }

    pub fn with_fetcher(fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            fetcher,
            mode: None,
            api_key: None,
            in_flight: Arc::new(AtomicBool::new(false)),
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Select the active provider. Fails if the provider requires an API
    /// key and none was supplied; the previous mode stays active then.
    pub fn set_mode(&mut self, mode: ProviderId, api_key: Option<&str>) -> Result<(), ConfigError> {
        if mode.requires_api_key() && api_key.is_none() {
            return Err(ConfigError::MissingApiKey(mode));
        }
        self.mode = Some(mode);
        self.api_key = api_key.map(str::to_string);
        self.lock().last_error = None;
        Ok(())
    }

    pub fn mode(&self) -> Option<ProviderId> {
        self.mode
    }

    pub fn state(&self) -> State {
        if self.in_flight.load(Ordering::SeqCst) {
            return State::Fetching;
        }
        let inner = self.lock();
        if inner.last_error.is_some() {
            return State::Failed;
        }
        if inner.reduced.is_some() {
            return State::Reduced;
        }
        drop(inner);
        match self.mode {
            Some(mode) => State::Ready(mode),
            None => State::Unconfigured,
        }
    }

    /// Run the pipeline in place and return the reduced report.
    ///
    /// On success the raw payload and report are stored on the session;
    /// on failure only the last error is updated and any previous report
    /// stays untouched.
    pub async fn start(&self, query: &Query) -> Result<ReducedReport, Error> {
        let provider = self.configured_provider(query)?;
        if self.acquire_flight().is_err() {
            return Err(Error::Busy);
        }
        let _guard = FlightGuard(self.in_flight.clone());

        let result = run_pipeline(provider.as_ref(), self.fetcher.as_ref(), query).await;
        self.store(result)
    }

    /// Schedule the pipeline on a tokio task. The callback fires exactly
    /// once with the report or the error — unless `stop` drops it first.
    ///
    /// Configuration problems are delivered through the callback, like
    /// every other failure; only a single-flight violation is returned
    /// directly.
    pub fn start_background<F>(&self, query: Query, callback: F) -> Result<(), Error>
    where
        F: FnOnce(Result<ReducedReport, Error>) + Send + 'static,
    {
        let provider = match self.configured_provider(&query) {
            Ok(provider) => provider,
            Err(err) => {
                callback(Err(err));
                return Ok(());
            }
        };
        if self.acquire_flight().is_err() {
            return Err(Error::Busy);
        }
        self.lock().callback = Some(Box::new(callback));

        let fetcher = Arc::clone(&self.fetcher);
        let inner = Arc::clone(&self.inner);
        let flight = Arc::clone(&self.in_flight);
        tokio::spawn(async move {
            let _guard = FlightGuard(flight);
            let result = run_pipeline(provider.as_ref(), fetcher.as_ref(), &query).await;

            let mut locked = inner.lock().unwrap_or_else(PoisonError::into_inner);
            match &result {
                Ok((raw, report)) => {
                    locked.raw = Some(raw.clone());
                    locked.reduced = Some(report.clone());
                    locked.last_error = None;
                }
                Err(err) => locked.last_error = Some(err.to_string()),
            }
            let callback = locked.callback.take();
            drop(locked);

            match callback {
                Some(callback) => callback(result.map(|(_, report)| report)),
                None => info!("completion callback was dropped; discarding result"),
            }
        });
        Ok(())
    }

    /// Drop the stored callback and clear the last error. In-flight work
    /// is not cancelled; its eventual result is discarded.
    pub fn stop(&self) {
        let mut inner = self.lock();
        inner.callback = None;
        inner.last_error = None;
    }

    /// Copy of the last raw provider payload.
    pub fn raw_payload(&self) -> Option<Value> {
        self.lock().raw.clone()
    }

    /// Copy of the last successful reduced report.
    pub fn reduced_report(&self) -> Option<ReducedReport> {
        self.lock().reduced.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn acquire_flight(&self) -> Result<(), ()> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|_| ())
    }

    /// Validate the query against the active mode and build the provider.
    fn configured_provider(&self, query: &Query) -> Result<Box<dyn WeatherProvider>, Error> {
        let mode = self.mode.ok_or(ConfigError::NoMode)?;

        let by_city_id = query.city_id.is_some() && mode == ProviderId::OpenWeather;
        if !by_city_id {
            if query.geodata.name.is_empty() {
                return Err(ConfigError::MissingCityName(mode).into());
            }
            if query.geodata.longitude == 0.0 || query.geodata.latitude == 0.0 {
                return Err(ConfigError::MissingCoordinates(mode).into());
            }
        }

        Ok(make_provider(mode, self.api_key.as_deref())?)
    }

    fn store(&self, result: Result<(Value, ReducedReport), Error>) -> Result<ReducedReport, Error> {
        let mut inner = self.lock();
        match result {
            Ok((raw, report)) => {
                inner.raw = Some(raw);
                inner.reduced = Some(report.clone());
                inner.last_error = None;
                Ok(report)
            }
            Err(err) => {
                inner.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::stub::StubFetcher;
    use crate::model::{FORECAST_DAYS, GeoData};
    use chrono::Duration as ChronoDuration;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::oneshot;

    /// Open-Meteo style payload with constant values across 48 hours, so
    /// assertions hold no matter when the pipeline samples "now".
    fn openmeteo_payload() -> Value {
        let today = Local::now().date_naive();
        let times: Vec<String> = (0..48)
            .map(|h| {
                let date = today + ChronoDuration::days(h / 24);
                format!("{}T{:02}:00", date.format("%Y-%m-%d"), h % 24)
            })
            .collect();
        let daily_time: Vec<String> = (0..6)
            .map(|d| (today + ChronoDuration::days(d)).format("%Y-%m-%d").to_string())
            .collect();

        json!({
            "longitude": 13.41,
            "latitude": 52.52,
            "hourly_units": {
                "temperature_2m": "°C",
                "windspeed_10m": "km/h",
                "precipitation_probability": "%"
            },
            "hourly": {
                "time": times,
                "temperature_2m": vec![21.0; 48],
                "relativehumidity_2m": vec![55.0; 48],
                "apparent_temperature": vec![20.0; 48],
                "weathercode": vec![3i64; 48],
                "windspeed_10m": vec![14.0; 48],
                "winddirection_10m": vec![270.0; 48],
                "precipitation_probability": vec![35.0; 48],
                "pressure_msl": vec![1013.0; 48],
                "uv_index": vec![4.0; 48],
                "visibility": vec![24140.0; 48]
            },
            "daily": {
                "time": daily_time,
                "sunrise": [format!("{}T05:58", today.format("%Y-%m-%d"))],
                "sunset": [format!("{}T20:45", today.format("%Y-%m-%d"))],
                "weathercode": [3, 0, 1, 2, 61, 95],
                "precipitation_probability_max": [40.0, 5.0, 10.0, 15.0, 80.0, 90.0],
                "temperature_2m_max": [24.0, 25.0, 22.0, 23.0, 21.0, 22.0],
                "temperature_2m_min": [12.0, 13.0, 11.0, 12.0, 14.0, 13.0],
                "uv_index_max": [5.0, 6.0, 4.0, 5.0, 3.0, 2.0]
            }
        })
    }

    fn query() -> Query {
        Query::new(GeoData::new("Berlin, Deutschland", 13.41, 52.52))
    }

    fn openmeteo_session(delay: Option<Duration>) -> Session {
        let mut stub = StubFetcher::new().with("open-meteo", openmeteo_payload());
        if let Some(delay) = delay {
            stub = stub.with_delay(delay);
        }
        let mut session = Session::with_fetcher(Arc::new(stub));
        session.set_mode(ProviderId::OpenMeteo, None).unwrap();
        session
    }

    #[tokio::test]
    async fn end_to_end_openmeteo() {
        let session = openmeteo_session(None);
        let report = session.start(&query()).await.unwrap();

        // weathercode 3 maps to ("28", "N").
        assert_eq!(report.current.yahoo_code, "28");
        assert_eq!(report.current.meteo_code, "N");
        assert_eq!(report.forecast.len(), FORECAST_DAYS);

        assert!(session.raw_payload().is_some());
        assert_eq!(session.reduced_report().unwrap(), report);
        assert!(session.last_error().is_none());
        assert_eq!(session.state(), State::Reduced);
    }

    #[tokio::test]
    async fn second_start_while_in_flight_is_busy() {
        let session = openmeteo_session(Some(Duration::from_millis(100)));

        let (tx, rx) = oneshot::channel();
        session
            .start_background(query(), move |result| {
                let _ = tx.send(result.is_ok());
            })
            .unwrap();

        let err = session.start(&query()).await.unwrap_err();
        assert!(matches!(err, Error::Busy));

        // The first flight still completes and fires its callback once.
        assert!(rx.await.unwrap());
        assert!(session.reduced_report().is_some());
    }

    #[tokio::test]
    async fn stop_drops_the_callback_but_not_the_work() {
        let session = openmeteo_session(Some(Duration::from_millis(50)));

        let (tx, rx) = oneshot::channel();
        session
            .start_background(query(), move |result| {
                let _ = tx.send(result.is_ok());
            })
            .unwrap();
        session.stop();

        // The callback was dropped, so the sender side never fires.
        assert!(rx.await.is_err());
        // The in-flight work still ran to completion and stored its result.
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(session.reduced_report().is_some());
    }

    #[tokio::test]
    async fn failures_keep_the_previous_report() {
        let session = openmeteo_session(None);
        let first = session.start(&query()).await.unwrap();

        // No stub is registered for MSN; the fetch fails.
        let mut session = session;
        session.set_mode(ProviderId::Msn, None).unwrap();
        let err = session.start(&query()).await.unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));

        assert!(session.last_error().is_some());
        assert_eq!(session.reduced_report().unwrap(), first);
        assert_eq!(session.state(), State::Failed);
    }

    #[tokio::test]
    async fn config_errors_are_delivered_through_the_callback() {
        let session = Session::with_fetcher(Arc::new(StubFetcher::new()));

        let (tx, rx) = oneshot::channel();
        session
            .start_background(query(), move |result| {
                let _ = tx.send(result.err().map(|e| e.to_string()));
            })
            .unwrap();

        let message = rx.await.unwrap().expect("must be an error");
        assert!(message.contains("no provider selected"));
    }

    #[test]
    fn set_mode_requires_key_for_openweather() {
        let mut session = Session::with_fetcher(Arc::new(StubFetcher::new()));

        let err = session.set_mode(ProviderId::OpenWeather, None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey(ProviderId::OpenWeather)));
        assert_eq!(session.state(), State::Unconfigured);

        session.set_mode(ProviderId::OpenWeather, Some("KEY")).unwrap();
        assert_eq!(session.state(), State::Ready(ProviderId::OpenWeather));
    }

    #[test]
    fn missing_geodata_is_rejected() {
        let mut session = Session::with_fetcher(Arc::new(StubFetcher::new()));
        session.set_mode(ProviderId::OpenMeteo, None).unwrap();

        let no_name = Query::new(GeoData::new("", 13.41, 52.52));
        let err = session.configured_provider(&no_name).unwrap_err();
        assert!(err.to_string().contains("missing city name"));

        let no_coords = Query::new(GeoData::new("Berlin", 0.0, 0.0));
        let err = session.configured_provider(&no_coords).unwrap_err();
        assert!(err.to_string().contains("missing coordinates"));
    }
}
