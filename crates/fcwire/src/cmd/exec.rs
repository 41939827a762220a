use crate::cmd::ExecArgs;
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_reply, OutputFormat};

pub fn run(args: ExecArgs, format: OutputFormat) -> CliResult<i32> {
    let mut vehicle = args.peer.launch()?;

    let command = args.command.join(" ");
    let payload = vehicle
        .raw_command(&command)
        .map_err(|err| client_error("exec failed", err))?;
    let notifications = vehicle.take_notifications();

    print_reply(&command, payload.as_deref(), &notifications, format);

    vehicle
        .shutdown()
        .map_err(|err| client_error("failed to stop peer", err))?;
    Ok(SUCCESS)
}
