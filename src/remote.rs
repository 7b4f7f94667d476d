//! MQTT remote control
//!
//! Subscribes to a topic on a background thread and forwards parsed
//! commands to the main loop, which applies them to the light rig before
//! taking the frame snapshot.

use crate::animation::{LightRig, COLOR_TOTAL, MAX_INTENSITY, MIN_INTENSITY};
use crate::error::{LightError, Result};
use crate::geometry::Point;
use crate::lighting::{LightSource, Rgb};
use log::{debug, error, info, warn};
use rumqttc::{Client, Event, MqttOptions, Packet, QoS};
use serde::Deserialize;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const DEFAULT_PORT: u16 = 1883;
const CLIENT_ID: &str = "umbra";

/// A command received over MQTT.
///
/// JSON payloads are tagged by `action`, e.g.
/// `{"action": "set_intensity", "value": 80}`. A few bare words
/// (`clear`, `orbit`) are accepted as plain text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RemoteCommand {
    /// Coordinates are kernel space (Y-up)
    PlaceSource {
        x: f32,
        y: f32,
        #[serde(default)]
        intensity: Option<f32>,
        #[serde(default)]
        color: Option<Rgb>,
    },
    ClearSources,
    SetIntensity {
        value: f32,
    },
    SetColor {
        r: f32,
        g: f32,
        b: f32,
    },
    ResumeOrbit,
}

impl RemoteCommand {
    /// Returns false if the command had no effect (light limit reached)
    pub fn apply(&self, rig: &mut LightRig) -> bool {
        match *self {
            RemoteCommand::PlaceSource {
                x,
                y,
                intensity,
                color,
            } => {
                let mut source = LightSource {
                    position: Point::new(x, y),
                    ..*rig.cursor()
                };
                if let Some(i) = intensity.filter(|i| !i.is_nan()) {
                    source.intensity = i.clamp(MIN_INTENSITY, MAX_INTENSITY);
                }
                if let Some(c) = color {
                    source.color = c.normalized_to(COLOR_TOTAL);
                }
                rig.place(source)
            },
            RemoteCommand::ClearSources => {
                rig.clear_placed();
                true
            },
            RemoteCommand::SetIntensity { value } => {
                rig.set_intensity(value);
                true
            },
            RemoteCommand::SetColor { r, g, b } => {
                rig.set_color(Rgb::new(r, g, b));
                true
            },
            RemoteCommand::ResumeOrbit => {
                rig.resume_orbit();
                true
            },
        }
    }
}

/// Parse a payload as JSON, falling back to the plain-text aliases
pub fn parse_command(payload: &str) -> Result<RemoteCommand> {
    let text = payload.trim();
    match text {
        "clear" | "clear_sources" => return Ok(RemoteCommand::ClearSources),
        "orbit" | "resume_orbit" => return Ok(RemoteCommand::ResumeOrbit),
        _ => {},
    }
    Ok(serde_json::from_str(text)?)
}

/// MQTT subscriber that receives commands in a background thread
pub struct RemoteControl {
    receiver: Receiver<RemoteCommand>,
    _thread: thread::JoinHandle<()>,
}

impl RemoteControl {
    /// Connect to the broker and subscribe to `topic`.
    /// Fails immediately if the broker cannot be reached.
    pub fn connect(host: &str, topic: &str) -> Result<Self> {
        let mut options = MqttOptions::new(CLIENT_ID, host, DEFAULT_PORT);
        options.set_keep_alive(Duration::from_secs(30));

        let (client, mut connection) = Client::new(options, 10);

        client.subscribe(topic, QoS::AtMostOnce).map_err(|e| {
            LightError::Mqtt(format!("failed to subscribe to '{}': {}", topic, e))
        })?;

        // Poll once so an unreachable broker fails here rather than later
        match connection.iter().next() {
            Some(Ok(_)) => {},
            Some(Err(e)) => {
                return Err(LightError::Mqtt(format!(
                    "failed to connect to {}:{}: {}",
                    host, DEFAULT_PORT, e
                )));
            },
            None => {
                return Err(LightError::Mqtt(format!(
                    "failed to connect to {}:{}: connection closed",
                    host, DEFAULT_PORT
                )));
            },
        }

        let (sender, receiver) = mpsc::channel();
        let topic_owned = topic.to_string();

        let handle = thread::Builder::new()
            .name("umbra-mqtt".into())
            .spawn(move || {
                // Keep the client alive for as long as the connection runs
                let _client = client;
                Self::message_loop(connection, sender, &topic_owned);
            })?;

        info!(
            "MQTT connected to {}:{}, subscribed to '{}'",
            host, DEFAULT_PORT, topic
        );

        Ok(Self {
            receiver,
            _thread: handle,
        })
    }

    fn message_loop(
        mut connection: rumqttc::Connection,
        sender: Sender<RemoteCommand>,
        topic: &str,
    ) {
        for event in connection.iter() {
            match event {
                Ok(Event::Incoming(Packet::Publish(publish))) if publish.topic == topic => {
                    let Ok(text) = std::str::from_utf8(&publish.payload) else {
                        warn!("MQTT payload is not UTF-8, ignored");
                        continue;
                    };
                    match parse_command(text) {
                        Ok(command) => {
                            debug!("MQTT command {:?}", command);
                            if sender.send(command).is_err() {
                                // Main loop gone
                                break;
                            }
                        },
                        Err(e) => warn!("MQTT payload ignored: {}", e),
                    }
                },
                Ok(_) => {},
                Err(e) => {
                    // rumqttc reconnects on the next iteration
                    error!("MQTT error: {}", e);
                    thread::sleep(Duration::from_secs(1));
                },
            }
        }
    }

    /// Drain every command received since the last call (non-blocking)
    pub fn poll(&self) -> Vec<RemoteCommand> {
        self.receiver.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_commands() {
        assert_eq!(
            parse_command(r#"{"action": "set_intensity", "value": 80}"#).unwrap(),
            RemoteCommand::SetIntensity { value: 80.0 }
        );
        assert_eq!(
            parse_command(r#"{"action":"place_source","x":1,"y":2}"#).unwrap(),
            RemoteCommand::PlaceSource {
                x: 1.0,
                y: 2.0,
                intensity: None,
                color: None
            }
        );
        assert_eq!(
            parse_command(
                r#"{"action":"place_source","x":1,"y":2,"color":{"r":1,"g":0,"b":0}}"#
            )
            .unwrap(),
            RemoteCommand::PlaceSource {
                x: 1.0,
                y: 2.0,
                intensity: None,
                color: Some(Rgb::new(1.0, 0.0, 0.0))
            }
        );
        assert_eq!(
            parse_command(r#"{"action":"clear_sources"}"#).unwrap(),
            RemoteCommand::ClearSources
        );
    }

    #[test]
    fn test_parse_plain_text() {
        assert_eq!(parse_command(" clear\n").unwrap(), RemoteCommand::ClearSources);
        assert_eq!(parse_command("orbit").unwrap(), RemoteCommand::ResumeOrbit);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_command("hello"), Err(LightError::Json(_))));
        assert!(parse_command(r#"{"action":"explode"}"#).is_err());
        assert!(parse_command(r#"{"action":"set_intensity"}"#).is_err());
    }

    #[test]
    fn test_apply_place_keeps_cursor() {
        let mut rig = LightRig::new(Point::ORIGIN, 10);
        rig.set_intensity(20.0);
        let cmd = RemoteCommand::PlaceSource {
            x: 3.0,
            y: 4.0,
            intensity: Some(90.0),
            color: Some(Rgb::new(0.0, 1.0, 0.0)),
        };
        assert!(cmd.apply(&mut rig));

        let placed = rig.placed()[0];
        assert_eq!(placed.position, Point::new(3.0, 4.0));
        assert_eq!(placed.intensity, 90.0);
        assert_eq!(placed.color, Rgb::new(0.0, 3.0, 0.0));
        assert_eq!(rig.cursor().intensity, 20.0);
        assert_eq!(rig.cursor().color, Rgb::WHITE);
    }

    #[test]
    fn test_apply_other_commands() {
        let mut rig = LightRig::new(Point::ORIGIN, 2);
        assert!(RemoteCommand::PlaceSource {
            x: 0.0,
            y: 0.0,
            intensity: None,
            color: None
        }
        .apply(&mut rig));
        assert!(!RemoteCommand::PlaceSource {
            x: 1.0,
            y: 0.0,
            intensity: None,
            color: None
        }
        .apply(&mut rig));

        assert!(RemoteCommand::ClearSources.apply(&mut rig));
        assert!(rig.placed().is_empty());

        RemoteCommand::SetIntensity { value: 500.0 }.apply(&mut rig);
        assert_eq!(rig.cursor().intensity, 200.0);

        rig.pointer_moved(Point::new(1.0, 1.0));
        RemoteCommand::ResumeOrbit.apply(&mut rig);
        assert!(rig.is_orbiting());
    }
}
