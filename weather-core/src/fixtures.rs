//! Forecast payloads shaped like the upstream `/forecast` response, for tests.

use serde_json::{Value, json};

use crate::model::{ForecastResponse, ForecastSample};

const CONDITIONS: [&str; 5] = ["Clear", "Clouds", "Rain", "Snow", "Mist"];

/// JSON for the `index`-th sample: 3-hour steps from 2024-05-01 00:00.
pub fn sample_json(index: usize) -> Value {
    let hours = index * 3;
    let day = 1 + hours / 24;
    let hour = hours % 24;
    json!({
        "dt": 1_714_521_600_u64 + (hours as u64) * 3600,
        "main": {
            "temp": 10.0 + index as f64,
            "feels_like": 9.0 + index as f64,
            "humidity": 70,
            "pressure": 1012
        },
        "weather": [{
            "id": 800,
            "main": CONDITIONS[index % CONDITIONS.len()],
            "description": "sky",
            "icon": "01d"
        }],
        "wind": { "speed": 3.6, "deg": 240 },
        "pop": 0.25,
        "sys": { "pod": "d" },
        "dt_txt": format!("2024-05-{day:02} {hour:02}:00:00")
    })
}

pub fn forecast_json(city: &str, samples: usize) -> Value {
    let list: Vec<Value> = (0..samples).map(sample_json).collect();
    json!({
        "cod": "200",
        "message": 0,
        "cnt": samples,
        "list": list,
        "city": {
            "id": 2_643_743,
            "name": city,
            "coord": { "lat": 51.5085, "lon": -0.1257 },
            "country": "GB",
            "timezone": 3600
        }
    })
}

pub fn sample(index: usize) -> ForecastSample {
    serde_json::from_value(sample_json(index)).expect("fixture sample")
}

pub fn samples(count: usize) -> Vec<ForecastSample> {
    (0..count).map(sample).collect()
}

pub fn forecast(city: &str, samples: usize) -> ForecastResponse {
    serde_json::from_value(forecast_json(city, samples)).expect("fixture forecast")
}
