use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tracing::info;

use crate::cmd::MissionArgs;
use crate::exit::{client_error, CliResult, SUCCESS};

/// Rough conversion at mid latitudes; good enough for short demo hops.
const APPROX_DEGS_PER_METRE: f64 = 9e-6;

/// The scripted demo flight: connect, take off, fly a row of waypoints
/// east of the starting position, then land.
///
/// The waypoint-reached handler only bumps a shared counter; the next
/// waypoint is issued from the poll loop, never from inside the drain (a
/// handler re-entering the session would interleave two commands on the
/// wire).
pub fn run(args: MissionArgs) -> CliResult<i32> {
    let mut vehicle = args.peer.launch()?;

    let reached = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&reached);
    vehicle.on_notification("waypointReached", move || {
        counter.set(counter.get() + 1);
        info!(reached = counter.get(), "waypoint reached");
    });

    vehicle
        .connect()
        .map_err(|err| client_error("connection failed", err))?;
    vehicle
        .start_takeoff_sequence()
        .map_err(|err| client_error("take-off failed", err))?;

    let (lat, mut lon) = vehicle
        .position()
        .map_err(|err| client_error("position query failed", err))?;
    info!(lat, lon, "initial position");

    let step = args.step_metres * APPROX_DEGS_PER_METRE;
    lon += step;
    vehicle
        .set_waypoint(lat, lon, None)
        .map_err(|err| client_error("waypoint failed", err))?;

    let mut dispatched = 1u32;
    loop {
        let (cur_lat, cur_lon) = vehicle
            .position()
            .map_err(|err| client_error("position poll failed", err))?;
        info!(lat = cur_lat, lon = cur_lon, "position");

        vehicle.handle_notifications();

        let done = reached.get();
        if done >= args.waypoints {
            info!(waypoints = done, "mission complete, landing");
            vehicle
                .start_landing_sequence()
                .map_err(|err| client_error("landing failed", err))?;
            break;
        }
        if done >= dispatched {
            lon += step;
            vehicle
                .set_waypoint(lat, lon, None)
                .map_err(|err| client_error("waypoint failed", err))?;
            dispatched += 1;
        }

        std::thread::sleep(Duration::from_millis(args.poll_interval_ms));
    }

    vehicle
        .shutdown()
        .map_err(|err| client_error("failed to stop peer", err))?;
    Ok(SUCCESS)
}
