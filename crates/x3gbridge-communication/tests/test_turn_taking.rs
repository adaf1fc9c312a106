mod common;

use common::{bridge, line};
use x3gbridge_communication::{ControlMessage, Outcome};

#[test]
fn test_idle_line_gets_single_ok() {
    let (mut bridge, _) = bridge(1);
    assert_eq!(line(&mut bridge, "G1 X10"), "ok\n");
    assert_eq!(line(&mut bridge, "M82"), "ok\n");
}

#[test]
fn test_temperature_report_single_extruder() {
    let (mut bridge, _) = bridge(1);
    bridge.forward_mut().bot.extruder_temp[0] = 205;
    bridge.forward_mut().bot.platform_temp = 60;

    assert_eq!(line(&mut bridge, "M105"), "ok T:205 /0 B:60 /0\n");
}

#[test]
fn test_temperature_report_names_tools_on_dual_extruder() {
    let (mut bridge, _) = bridge(2);
    bridge.forward_mut().bot.extruder_temp = [205, 190];

    assert_eq!(
        line(&mut bridge, "M105"),
        "ok T0:205 /0 T1:190 /0 B:0 /0\n"
    );
}

#[test]
fn test_heating_wait_withholds_ok_until_ready() {
    let (mut bridge, _) = bridge(1);
    bridge.forward_mut().bot.extruder_temp[0] = 20;

    // the wait resets the reply, the implicit poll fills it
    assert_eq!(line(&mut bridge, "M109 S200"), " T:20 /200 B:0 /0\n");
    assert!(bridge.session().is_waiting());
    assert_eq!(bridge.forward().lines, vec!["M109 S200", "M105"]);

    bridge.forward_mut().bot.extruder_temp[0] = 150;
    assert_eq!(line(&mut bridge, ""), " T:150 /200 B:0 /0\n");
    assert!(bridge.session().is_waiting());

    bridge.forward_mut().bot.extruder_temp[0] = 200;
    bridge.forward_mut().bot.extruder_ready[0] = true;
    assert_eq!(line(&mut bridge, ""), " T:200 /200 B:0 /0\nok\n");
    assert!(!bridge.session().is_waiting());

    assert_eq!(line(&mut bridge, "G1 X1"), "ok\n");
}

#[test]
fn test_host_poll_clears_wait_with_one_ok() {
    let (mut bridge, _) = bridge(1);
    line(&mut bridge, "M190 S60");
    assert!(bridge.session().is_waiting());

    bridge.forward_mut().bot.platform_temp = 60;
    bridge.forward_mut().bot.platform_ready = true;
    let reply = line(&mut bridge, "M105");

    assert_eq!(reply, " T:0 /0 B:60 /60\nok\n");
    assert_eq!(reply.matches("ok").count(), 1);
}

#[test]
fn test_auto_poll_runs_once_per_line() {
    let (mut bridge, _) = bridge(1);
    line(&mut bridge, "M109 S200");
    let polls_before = bridge.forward().lines.len();

    line(&mut bridge, "");

    // the blank line plus exactly one synthesized poll
    assert_eq!(bridge.forward().lines.len(), polls_before + 2);
    assert_eq!(bridge.forward().lines.last().map(String::as_str), Some("M105"));
    assert!(bridge.session().is_waiting());
}

#[test]
fn test_button_wait_and_message() {
    let (mut bridge, _) = bridge(1);
    bridge.forward_mut().bot.motherboard =
        x3gbridge_communication::MotherboardFlags::WAIT_FOR_BUTTON;

    let reply = line(&mut bridge, "M117 Press the button");
    assert!(bridge.session().is_waiting());
    assert!(!reply.contains("ok"));

    bridge.forward_mut().bot.motherboard = Default::default();
    assert_eq!(line(&mut bridge, ""), " T:0 /0 B:0 /0\nok\n");
}

#[test]
fn test_homing_reports_position_when_done() {
    let (mut bridge, _) = bridge(1);
    bridge.forward_mut().bot.queue_busy = true;
    bridge.forward_mut().bot.position.z = 4000;

    assert_eq!(line(&mut bridge, "G28"), " T:0 /0 B:0 /0\n");

    bridge.forward_mut().bot.queue_busy = false;
    let reply = line(&mut bridge, "");
    assert_eq!(
        reply,
        " T:0 /0 B:0 /0 X:0.00 Y:0.00 Z:10.00 E:0.00\nok\n"
    );
    assert_eq!(bridge.session().machine().read().position.z, 10.0);
}

#[test]
fn test_firmware_identification() {
    let (mut bridge, _) = bridge(1);
    assert_eq!(
        line(&mut bridge, "M115"),
        "ok PROTOCOL_VERSION:0.1 FIRMWARE_NAME:Sailfish FIRMWARE_VERSION:7.60 \
         FIRMWARE_URL:http://www.sailfishfirmware.com MACHINE_TYPE:r2 EXTRUDER_COUNT:1\n"
    );
}

#[test]
fn test_connect_seeds_greeting() {
    let (mut bridge, _) = bridge(1);
    line(&mut bridge, "M109 S200");
    bridge.connect();
    assert_eq!(bridge.reply(), "start\n");
    assert!(!bridge.session().is_waiting());

    bridge.disconnect();
    assert!(bridge.reply().is_empty());
}

#[test]
fn test_clear_cancel_when_idle_drains_queue() {
    let (mut bridge, _) = bridge(1);
    bridge.control(ControlMessage::ClearCancel);
    assert!(bridge.session().is_waiting());

    // queue is already empty on the bot
    bridge.begin_line();
    let outcome = bridge.write_line("");
    bridge.end_line();
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(bridge.reply(), " T:0 /0 B:0 /0\nok\n");
}
