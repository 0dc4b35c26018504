use log::debug;

use crate::{
    config::ClientConfig,
    error::ClientError,
    http::{HttpError, HttpRequest, HttpRequester, ReqwestRequester},
    model::{Field, ForecastPoint, RawForecastResponse, RawHourPoint, Source},
    Config,
};

/// StormGlass `/weather/point` client.
///
/// Holds only immutable configuration, so one instance can serve
/// concurrent calls.
#[derive(Debug, Clone)]
pub struct ForecastClient<R> {
    http: R,
    api_url: String,
    api_token: String,
    source: Source,
}

impl<R: HttpRequester> ForecastClient<R> {
    pub fn new(http: R, config: ClientConfig) -> Self {
        Self {
            http,
            api_url: config.api_url,
            api_token: config.api_token,
            source: config.source,
        }
    }

    pub fn source(&self) -> Source {
        self.source
    }

    fn point_url(&self) -> String {
        format!("{}/weather/point", self.api_url.trim_end_matches('/'))
    }

    pub async fn fetch_points(&self, lat: f64, lng: f64) -> Result<Vec<ForecastPoint>, ClientError> {
        let request = HttpRequest::get(self.point_url())
            .query("lat", lat)
            .query("lng", lng)
            .query("params", Field::join(Field::all()))
            .query("source", self.source)
            .header("Authorization", self.api_token.as_str());

        debug!("requesting forecast for lat={lat} lng={lng} source={}", self.source);

        let response = self.http.get(&request).await.map_err(|err| match err {
            HttpError::Response { status, body } => ClientError::upstream(status, &body),
            HttpError::Network { message } => ClientError::transport(message),
        })?;

        if !(200..300).contains(&response.status) {
            return Err(ClientError::upstream(response.status, &response.body));
        }

        let raw: RawForecastResponse = serde_json::from_value(response.body)
            .map_err(|e| ClientError::transport(format!("unexpected response shape: {e}")))?;

        Ok(normalize(&raw, self.source))
    }
}

impl ForecastClient<ReqwestRequester> {
    /// Build a client from the on-disk configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client_config = config.client_config()?;

        let http = match config.stormglass().and_then(|sg| sg.timeout()) {
            Some(timeout) => ReqwestRequester::with_timeout(timeout)?,
            None => ReqwestRequester::new(),
        };

        Ok(Self::new(http, client_config))
    }
}

/// Keep the complete hours and project each onto `source`'s readings.
pub fn normalize(raw: &RawForecastResponse, source: Source) -> Vec<ForecastPoint> {
    let points: Vec<ForecastPoint> =
        raw.hours.iter().filter_map(|hour| to_point(hour, source)).collect();

    debug!(
        "normalized {} of {} forecast hours from source {source}",
        points.len(),
        raw.hours.len()
    );

    points
}

/// A reading counts only if it is truthy: missing, null, `0` and NaN are all
/// rejected, so an hour with a genuine zero (e.g. calm wind) is dropped.
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

fn to_point(hour: &RawHourPoint, source: Source) -> Option<ForecastPoint> {
    let time = hour.time.as_deref().filter(|t| !t.is_empty())?;
    let get = |field| present(hour.value(field, source));

    Some(ForecastPoint {
        time: time.to_string(),
        swell_direction: get(Field::SwellDirection)?,
        swell_height: get(Field::SwellHeight)?,
        swell_period: get(Field::SwellPeriod)?,
        wave_direction: get(Field::WaveDirection)?,
        wave_height: get(Field::WaveHeight)?,
        wind_direction: get(Field::WindDirection)?,
        wind_speed: get(Field::WindSpeed)?,
    })
}
