use std::io::{Read, Write};
use std::process::{ChildStdin, ChildStdout};

use fcwire_protocol::{Dispatcher, Session, SessionConfig};
use fcwire_transport::{PeerCommand, PeerProcess};
use tracing::{info, warn};

use crate::error::{ClientError, Result};

/// A vehicle reached through a launched flight-controller bridge process.
pub type PeerVehicle = Vehicle<ChildStdout, ChildStdin>;

/// Typed facade over a protocol session with the flight-controller peer.
///
/// Wire command names are the peer's literal names (`getHeading`,
/// `setWaypoint`, ...); each method builds the command line, blocks until
/// the peer's completion marker, and parses the payload.
pub struct Vehicle<R, W> {
    session: Session<R, W>,
    dispatcher: Dispatcher,
    peer: Option<PeerProcess>,
}

impl Vehicle<ChildStdout, ChildStdin> {
    /// Launch the bridge process and build a session over its pipes.
    pub fn launch(command: &PeerCommand) -> Result<Self> {
        Self::launch_with_config(command, SessionConfig::default())
    }

    /// Launch with explicit session configuration.
    pub fn launch_with_config(command: &PeerCommand, config: SessionConfig) -> Result<Self> {
        let mut peer = PeerProcess::spawn(command)?;
        let stdio = peer.take_stdio()?;
        let session = Session::with_config(stdio.stdout, stdio.stdin, config);
        info!(pid = peer.id(), "vehicle interface ready");
        Ok(Self {
            session,
            dispatcher: Dispatcher::new(),
            peer: Some(peer),
        })
    }

    /// Stop the bridge process.
    pub fn shutdown(&mut self) -> Result<()> {
        if let Some(peer) = self.peer.as_mut() {
            peer.shutdown()?;
        }
        Ok(())
    }
}

impl<R: Read, W: Write> Vehicle<R, W> {
    /// Build a vehicle over an existing session (no owned peer process).
    pub fn from_parts(session: Session<R, W>, dispatcher: Dispatcher) -> Self {
        Self {
            session,
            dispatcher,
            peer: None,
        }
    }

    /// Send a raw command line and return the raw payload, if any.
    pub fn raw_command(&mut self, command: &str) -> Result<Option<String>> {
        Ok(self.session.send(command)?)
    }

    /// Connect to the vehicle and perform basic setup (sets home).
    ///
    /// Does not return until the peer's connection sequence completes.
    pub fn connect(&mut self) -> Result<()> {
        self.session.send("connection")?;
        Ok(())
    }

    /// Start the software-in-the-loop simulator on the peer side.
    pub fn init_sitl(&mut self) -> Result<()> {
        self.session.send("initSITL")?;
        Ok(())
    }

    /// Run the peer's self test. Disarms the vehicle.
    pub fn run_test(&mut self) -> Result<Option<String>> {
        info!("running vehicle self test (will disarm)");
        self.raw_command("runTest")
    }

    /// Heading in degrees from North.
    pub fn heading(&mut self) -> Result<f64> {
        self.float_query("getHeading")
    }

    /// Altitude above ground in meters.
    pub fn altitude(&mut self) -> Result<f64> {
        self.float_query("getAltitude")
    }

    /// Current latitude and longitude.
    ///
    /// A reply that does not split into two floats yields `(0.0, 0.0)`;
    /// position polls are best-effort and a malformed line must not abort
    /// a mission loop.
    pub fn position(&mut self) -> Result<(f64, f64)> {
        let reply = self.session.send("getPosition")?;
        match reply.as_deref().and_then(parse_position) {
            Some(position) => Ok(position),
            None => {
                warn!(reply = ?reply, "getPosition returned malformed payload");
                Ok((0.0, 0.0))
            }
        }
    }

    /// Fly to the given latitude/longitude at `alt` meters.
    ///
    /// When `alt` is `None` the current altitude is queried and held.
    pub fn set_waypoint(&mut self, lat: f64, lon: f64, alt: Option<f64>) -> Result<()> {
        let alt = match alt {
            Some(alt) => alt,
            None => self.altitude()?,
        };
        self.session.send(&format!("setWaypoint {lat} {lon} {alt}"))?;
        Ok(())
    }

    /// Travel on the given heading, in degrees from North.
    pub fn set_heading(&mut self, degrees: f64) -> Result<()> {
        info!(degrees, "setting heading");
        self.session.send(&format!("setHeading {degrees}"))?;
        Ok(())
    }

    /// Arm the copter and take off to the standard altitude.
    pub fn start_takeoff_sequence(&mut self) -> Result<()> {
        info!("starting take-off sequence");
        self.session.send("startTakeoffSequence")?;
        Ok(())
    }

    /// Begin landing.
    pub fn start_landing_sequence(&mut self) -> Result<()> {
        info!("starting landing sequence");
        self.session.send("startLandingSequence")?;
        Ok(())
    }

    /// Block until the vehicle is externally armed, or the peer gives up.
    ///
    /// Returns whether arming happened.
    pub fn wait_for_arm(&mut self) -> Result<bool> {
        self.bool_query("waitForArm")
    }

    /// Block until the vehicle is externally set to guided mode, or the
    /// peer gives up. Returns whether the mode change happened.
    pub fn wait_for_mode_arm(&mut self) -> Result<bool> {
        self.bool_query("waitForModeArm")
    }

    /// Register a handler for a notification name (upsert).
    pub fn on_notification(&mut self, name: impl Into<String>, handler: impl FnMut() + 'static) {
        self.dispatcher.register(name, handler);
    }

    /// Dispatch all queued notifications. Returns how many had a handler.
    pub fn handle_notifications(&mut self) -> usize {
        self.dispatcher.drain(&mut self.session)
    }

    /// Number of queued, undispatched notifications.
    pub fn pending_notifications(&self) -> usize {
        self.session.pending_notifications()
    }

    /// Remove and return all queued notification names, oldest first,
    /// without invoking handlers.
    pub fn take_notifications(&mut self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.session.pending_notifications());
        while let Some(name) = self.session.pop_notification() {
            names.push(name);
        }
        names
    }

    /// Consume the vehicle and return the underlying session.
    ///
    /// An owned peer process, if any, is stopped.
    pub fn into_session(self) -> Session<R, W> {
        self.session
    }

    fn float_query(&mut self, command: &'static str) -> Result<f64> {
        let reply = self
            .session
            .send(command)?
            .ok_or(ClientError::EmptyReply { command })?;
        reply
            .trim()
            .parse()
            .map_err(|_| ClientError::MalformedReply {
                command,
                payload: reply,
            })
    }

    fn bool_query(&mut self, command: &'static str) -> Result<bool> {
        let reply = self
            .session
            .send(command)?
            .ok_or(ClientError::EmptyReply { command })?;
        let value: i64 = reply
            .trim()
            .parse()
            .map_err(|_| ClientError::MalformedReply {
                command,
                payload: reply,
            })?;
        Ok(value != 0)
    }
}

fn parse_position(text: &str) -> Option<(f64, f64)> {
    let mut parts = text.split_whitespace();
    let lat = parts.next()?.parse().ok()?;
    let lon = parts.next()?.parse().ok()?;
    Some((lat, lon))
}

impl<R, W> std::fmt::Debug for Vehicle<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vehicle")
            .field("session", &self.session)
            .field("peer", &self.peer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::rc::Rc;

    use super::*;

    fn vehicle_over(input: &str) -> Vehicle<Cursor<Vec<u8>>, Vec<u8>> {
        let session = Session::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        Vehicle::from_parts(session, Dispatcher::new())
    }

    fn written(vehicle: Vehicle<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        let (_, writer) = vehicle.into_session().into_parts();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn altitude_parses_payload_to_float() {
        let mut vehicle = vehicle_over("COMMAND getAltitude\n12.5\nDONE\n");
        assert_eq!(vehicle.altitude().unwrap(), 12.5);
    }

    #[test]
    fn heading_with_malformed_payload_is_an_error() {
        let mut vehicle = vehicle_over("COMMAND getHeading\nnot-a-number\nDONE\n");
        let err = vehicle.heading().unwrap_err();
        assert!(matches!(
            err,
            ClientError::MalformedReply {
                command: "getHeading",
                ..
            }
        ));
    }

    #[test]
    fn heading_with_no_payload_is_an_error() {
        let mut vehicle = vehicle_over("COMMAND getHeading\nDONE\n");
        let err = vehicle.heading().unwrap_err();
        assert!(matches!(
            err,
            ClientError::EmptyReply {
                command: "getHeading"
            }
        ));
    }

    #[test]
    fn position_parses_two_floats() {
        let mut vehicle = vehicle_over("COMMAND getPosition\n51.5074 -0.1278\nDONE\n");
        assert_eq!(vehicle.position().unwrap(), (51.5074, -0.1278));
    }

    #[test]
    fn malformed_position_defaults_to_origin() {
        let mut vehicle = vehicle_over("COMMAND getPosition\nno fix yet\nDONE\n");
        assert_eq!(vehicle.position().unwrap(), (0.0, 0.0));
    }

    #[test]
    fn empty_position_reply_defaults_to_origin() {
        let mut vehicle = vehicle_over("COMMAND getPosition\nDONE\n");
        assert_eq!(vehicle.position().unwrap(), (0.0, 0.0));
    }

    #[test]
    fn set_waypoint_with_explicit_altitude() {
        let mut vehicle = vehicle_over("COMMAND setWaypoint\nDONE\n");
        vehicle.set_waypoint(51.5, -0.1, Some(10.0)).unwrap();
        assert_eq!(written(vehicle), "setWaypoint 51.5 -0.1 10\n");
    }

    #[test]
    fn set_waypoint_queries_current_altitude_when_unset() {
        let input = "COMMAND getAltitude\n22.5\nDONE\nCOMMAND setWaypoint\nDONE\n";
        let mut vehicle = vehicle_over(input);
        vehicle.set_waypoint(51.5, -0.1, None).unwrap();
        assert_eq!(
            written(vehicle),
            "getAltitude\nsetWaypoint 51.5 -0.1 22.5\n"
        );
    }

    #[test]
    fn wait_for_arm_converts_integer_reply() {
        let mut vehicle = vehicle_over("COMMAND waitForArm\n1\nDONE\n");
        assert!(vehicle.wait_for_arm().unwrap());

        let mut vehicle = vehicle_over("COMMAND waitForArm\n0\nDONE\n");
        assert!(!vehicle.wait_for_arm().unwrap());
    }

    #[test]
    fn notifications_arriving_mid_command_reach_registered_handlers() {
        let input = "COMMAND setWaypoint\nNOTIFY waypointReached\n3.2\nDONE\n";
        let mut vehicle = vehicle_over(input);

        let hits = Rc::new(RefCell::new(0));
        let count = Rc::clone(&hits);
        vehicle.on_notification("waypointReached", move || *count.borrow_mut() += 1);

        let reply = vehicle.raw_command("setWaypoint 1 2 3").unwrap();
        assert_eq!(reply.as_deref(), Some("3.2"));
        assert_eq!(vehicle.pending_notifications(), 1);
        assert_eq!(vehicle.handle_notifications(), 1);
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn timeout_surfaces_as_protocol_error() {
        let session = Session::with_config(
            Cursor::new(b"tick\ntick\ntick\n".to_vec()),
            Vec::new(),
            SessionConfig { line_budget: 2 },
        );
        let mut vehicle = Vehicle::from_parts(session, Dispatcher::new());
        let err = vehicle.connect().unwrap_err();
        assert!(matches!(
            err,
            ClientError::Protocol(fcwire_protocol::ProtocolError::Timeout { .. })
        ));
    }
}
