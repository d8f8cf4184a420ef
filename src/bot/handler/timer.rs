use crate::bot::{
    dispatcher::{Action, CommandKind, CommandSet, CommandSpec, DefaultAction, HandlerResult},
    processor::{format_duration, Tier, Timer, TimerError},
};

use super::{
    constants::NO_ACTIVE_TIMER_MESSAGE,
    utils::{parse_seconds, partition},
    Context,
};

/* Timer commands.
 * Everything runs under "{symbol}timer <action>", each action with its own tier.
 * Actions taking an optional timer name fall back to the active timer.
 */

const TIMER_HELP: &str = "Performs timer related actions: new, del, start, stop, restart, split, resplit, delsplit, renamesplit, status, report, list, active, rename, adjust, set, adjustsplit. Syntax: {symbol}timer [action] ; {symbol}timer without an action is equivalent to {symbol}timer status";
const DEFAULT_NAME_FORMAT: &str = "%Y%m%d%H%M";

pub fn command_set() -> CommandSet {
    let actions = vec![
        Action {
            name: "new",
            tier: Tier::Op,
            help: "Create a timer. Ops only. Syntax: {symbol}timer new [name]",
            handler: timer_new,
        },
        Action {
            name: "del",
            tier: Tier::Op,
            help: "Remove a timer. Ops only. Syntax: {symbol}timer del <name>",
            handler: timer_del,
        },
        Action {
            name: "start",
            tier: Tier::Regular,
            help: "Starts the named timer or the active timer. Regulars only. Syntax: {symbol}timer start [name]",
            handler: timer_start,
        },
        Action {
            name: "stop",
            tier: Tier::Regular,
            help: "Stops the named timer or the active timer. Regulars only. Syntax: {symbol}timer stop [name]",
            handler: timer_stop,
        },
        Action {
            name: "restart",
            tier: Tier::Regular,
            help: "Restart a named timer or the active timer. Regulars only. Syntax: {symbol}timer restart [name]",
            handler: timer_restart,
        },
        Action {
            name: "split",
            tier: Tier::Regular,
            help: "Create a split for the named or active timer. Regulars only. Syntax: {symbol}timer split <split name> [timer name]",
            handler: timer_split,
        },
        Action {
            name: "resplit",
            tier: Tier::Regular,
            help: "Update a split time for the named or active timer. Regulars only. Syntax: {symbol}timer resplit <split name> [timer name]",
            handler: timer_resplit,
        },
        Action {
            name: "delsplit",
            tier: Tier::Op,
            help: "Remove a split from the named or active timer. Ops only. Syntax: {symbol}timer delsplit <split name> [timer name]",
            handler: timer_delsplit,
        },
        Action {
            name: "renamesplit",
            tier: Tier::Op,
            help: "Rename a split of the named or active timer. Ops only. Syntax: {symbol}timer renamesplit <old name> <new name> [timer name]",
            handler: timer_renamesplit,
        },
        Action {
            name: "status",
            tier: Tier::Everyone,
            help: "Give the status of named or active timer. Syntax: {symbol}timer status [name]",
            handler: timer_status,
        },
        Action {
            name: "report",
            tier: Tier::Everyone,
            help: "Print a more detailed report of the named or active timer. Syntax: {symbol}timer report [name]",
            handler: timer_report,
        },
        Action {
            name: "list",
            tier: Tier::Regular,
            help: "Print a list of all known timers. Regulars only. Syntax: {symbol}timer list",
            handler: timer_list,
        },
        Action {
            name: "active",
            tier: Tier::Op,
            help: "Set timer by name to active. Ops only. Syntax: {symbol}timer active [name]",
            handler: timer_active,
        },
        Action {
            name: "rename",
            tier: Tier::Op,
            help: "Rename a timer. Ops only. Syntax: {symbol}timer rename <oldname> <newname>",
            handler: timer_rename,
        },
        Action {
            name: "adjust",
            tier: Tier::Op,
            help: "Add or remove seconds from the timer to adjust the time. Ops only. Syntax: {symbol}timer adjust <seconds> [timer name]",
            handler: timer_adjust,
        },
        Action {
            name: "set",
            tier: Tier::Op,
            help: "Set the elapsed time of the timer in seconds. Ops only. Syntax: {symbol}timer set <seconds> [timer name]",
            handler: timer_set,
        },
        Action {
            name: "adjustsplit",
            tier: Tier::Op,
            help: "Add or remove some seconds to the split time. Ops only. Syntax: {symbol}timer adjustsplit <seconds> <split name> [timer name]",
            handler: timer_adjustsplit,
        },
    ];

    CommandSet::new(
        "timer",
        vec![CommandSpec {
            name: "timer",
            tier: Tier::Everyone,
            help: TIMER_HELP,
            kind: CommandKind::Actions {
                actions,
                default: DefaultAction::Run("status"),
            },
        }],
    )
}

/* Utilities */

// Resolves the given or active timer name, replying if there is no such timer.
fn resolve_timer(ctx: &mut Context<'_>, name: &str) -> Option<String> {
    let Some(name) = ctx.state.resolve_timer_name(name) else {
        ctx.say(NO_ACTIVE_TIMER_MESSAGE);
        return None;
    };

    if !ctx.state.timers.contains(&name) {
        ctx.say(&format!("Timer \"{name}\" does not exist."));
        return None;
    }
    Some(name)
}

fn error_reply(timer_name: &str, error: &TimerError) -> String {
    match error {
        TimerError::NotRunning => format!("Timer \"{timer_name}\" is not running."),
        TimerError::NotStarted => format!("Timer \"{timer_name}\" has not been started yet."),
        TimerError::SplitExists(split) => format!("Split \"{split}\" already exists."),
        TimerError::NoSuchSplit(split) => format!("Split \"{split}\" does not exist."),
        TimerError::OutOfRange => format!("Timer \"{timer_name}\" cannot be adjusted that far."),
    }
}

/* Runs `f` on the named timer and says its reply.
 * The state is marked changed only if `f` succeeded.
 */
fn update_timer<F>(ctx: &mut Context<'_>, name: &str, f: F) -> HandlerResult
where
    F: FnOnce(&mut Timer) -> Result<String, TimerError>,
{
    let result = match ctx.state.timers.get_mut(name) {
        Some(timer) => f(timer),
        None => return Ok(()),
    };

    match result {
        Ok(reply) => {
            ctx.mark_changed();
            log::info!(
                "Timer - User {} updated timer {} in {}",
                ctx.sender.nick,
                name,
                ctx.channel
            );
            ctx.say(&reply);
        }
        Err(error) => {
            ctx.say(&error_reply(name, &error));
        }
    }
    Ok(())
}

fn timer_new(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let (name, _) = partition(args);
    let name = if name.is_empty() {
        ctx.now()
            .with_timezone(&ctx.settings.time_zone)
            .format(DEFAULT_NAME_FORMAT)
            .to_string()
    } else {
        name.to_string()
    };

    if !ctx.state.timers.insert(Timer::new(&name)) {
        ctx.say(&format!("Timer \"{name}\" already exists."));
        return Ok(());
    }

    ctx.state.active_timer = Some(name.clone());
    ctx.mark_changed();
    log::info!("Timer - User {} created timer {} in {}", ctx.sender.nick, name, ctx.channel);
    ctx.say(&format!("Timer \"{name}\" has been created."));
    Ok(())
}

fn timer_del(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let (name, _) = partition(args);
    if name.is_empty() {
        ctx.usage("{symbol}timer del <name>");
        return Ok(());
    }

    if ctx.state.timers.remove(name).is_none() {
        ctx.say(&format!("There is no timer with the name \"{name}\"."));
        return Ok(());
    }

    if ctx.state.active_timer.as_deref() == Some(name) {
        ctx.state.active_timer = None;
    }
    ctx.mark_changed();
    log::info!("Timer - User {} removed timer {} in {}", ctx.sender.nick, name, ctx.channel);
    ctx.say(&format!("Timer \"{name}\" has been removed."));
    Ok(())
}

fn timer_start(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let (name, _) = partition(args);
    let Some(name) = resolve_timer(ctx, name) else {
        return Ok(());
    };

    let now = ctx.now();
    update_timer(ctx, &name, |timer| {
        if timer.running {
            return Ok(format!("Timer \"{}\" is already running.", timer.name));
        }
        timer.start(now);
        Ok(format!("Timer \"{}\" has been started.", timer.name))
    })
}

fn timer_stop(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let (name, _) = partition(args);
    let Some(name) = resolve_timer(ctx, name) else {
        return Ok(());
    };

    let now = ctx.now();
    update_timer(ctx, &name, |timer| {
        let elapsed = timer.stop(now)?;
        Ok(format!(
            "Timer \"{}\" has been stopped: {}",
            timer.name,
            format_duration(elapsed)
        ))
    })
}

fn timer_restart(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let (name, _) = partition(args);
    let Some(name) = resolve_timer(ctx, name) else {
        return Ok(());
    };

    let now = ctx.now();
    update_timer(ctx, &name, |timer| {
        if !timer.running {
            return Err(TimerError::NotRunning);
        }
        timer.restart(now);
        Ok(format!("Timer \"{}\" has been restarted.", timer.name))
    })
}

fn timer_split(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let (split, rest) = partition(args);
    if split.is_empty() {
        ctx.usage("{symbol}timer split <split name> [timer name]");
        return Ok(());
    }
    let (timer_name, _) = partition(rest);
    let Some(name) = resolve_timer(ctx, timer_name) else {
        return Ok(());
    };

    let now = ctx.now();
    update_timer(ctx, &name, |timer| {
        let elapsed = timer.split(split, now)?;
        Ok(format!(
            "Split \"{split}\" has been created: {}",
            format_duration(elapsed)
        ))
    })
}

fn timer_resplit(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let (split, rest) = partition(args);
    if split.is_empty() {
        ctx.usage("{symbol}timer resplit <split name> [timer name]");
        return Ok(());
    }
    let (timer_name, _) = partition(rest);
    let Some(name) = resolve_timer(ctx, timer_name) else {
        return Ok(());
    };

    let now = ctx.now();
    update_timer(ctx, &name, |timer| {
        let elapsed = timer.resplit(split, now)?;
        Ok(format!(
            "Split \"{split}\" has been updated: {}",
            format_duration(elapsed)
        ))
    })
}

fn timer_delsplit(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let (split, rest) = partition(args);
    if split.is_empty() {
        ctx.usage("{symbol}timer delsplit <split name> [timer name]");
        return Ok(());
    }
    let (timer_name, _) = partition(rest);
    let Some(name) = resolve_timer(ctx, timer_name) else {
        return Ok(());
    };

    update_timer(ctx, &name, |timer| {
        timer.remove_split(split)?;
        Ok(format!(
            "Split \"{split}\" has been removed from timer \"{}\".",
            timer.name
        ))
    })
}

fn timer_renamesplit(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let (old_name, rest) = partition(args);
    let (new_name, rest) = partition(rest);
    if old_name.is_empty() || new_name.is_empty() {
        ctx.usage("{symbol}timer renamesplit <old name> <new name> [timer name]");
        return Ok(());
    }
    let (timer_name, _) = partition(rest);
    let Some(name) = resolve_timer(ctx, timer_name) else {
        return Ok(());
    };

    update_timer(ctx, &name, |timer| {
        timer.rename_split(old_name, new_name)?;
        Ok(format!(
            "Split \"{old_name}\" has been renamed to \"{new_name}\"."
        ))
    })
}

fn timer_status(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let (name, _) = partition(args);
    let Some(name) = resolve_timer(ctx, name) else {
        return Ok(());
    };

    let now = ctx.now();
    let reply = match ctx.state.timers.get(&name) {
        Some(timer) => match timer.elapsed(now) {
            Some(elapsed) if timer.running => {
                format!("Timer \"{name}\" is running: {}", format_duration(elapsed))
            }
            Some(elapsed) if timer.is_stopped() => {
                format!("Timer \"{name}\" is stopped: {}", format_duration(elapsed))
            }
            _ => format!("Timer \"{name}\" has not been started yet."),
        },
        None => return Ok(()),
    };
    ctx.say(&reply);
    Ok(())
}

fn timer_report(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let (name, _) = partition(args);
    let Some(name) = resolve_timer(ctx, name) else {
        return Ok(());
    };

    let now = ctx.now();
    let reply = match ctx.state.timers.get(&name) {
        Some(timer) => match timer.elapsed(now) {
            Some(elapsed) => {
                let state = if timer.running { "running" } else { "stopped" };
                let splits = match timer.splits_string() {
                    Some(splits) => format!("with splits: {splits}"),
                    None => "without splits.".to_string(),
                };
                format!(
                    "Timer \"{name}\" {state}: {} {splits}",
                    format_duration(elapsed)
                )
            }
            None => format!("Timer \"{name}\" has not been started yet."),
        },
        None => return Ok(()),
    };
    ctx.say(&reply);
    Ok(())
}

fn timer_list(ctx: &mut Context<'_>, _args: &str) -> HandlerResult {
    if ctx.state.timers.is_empty() {
        ctx.say("No timers exist.");
        return Ok(());
    }

    let active = ctx.state.active_timer.clone();
    let timers: Vec<String> = ctx
        .state
        .timers
        .iter()
        .map(|timer| {
            let running = if timer.running { "*" } else { "" };
            let default = if active.as_deref() == Some(timer.name.as_str()) {
                "!"
            } else {
                ""
            };
            format!("{}{running}{default}", timer.name)
        })
        .collect();

    ctx.say(&format!(
        "Known timers: {}  (* = running, ! = default)",
        timers.join(", ")
    ));
    Ok(())
}

fn timer_active(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let (name, _) = partition(args);
    let Some(name) = resolve_timer(ctx, name) else {
        return Ok(());
    };

    ctx.state.active_timer = Some(name.clone());
    ctx.mark_changed();
    ctx.say(&format!("Timer \"{name}\" is now active."));
    Ok(())
}

fn timer_rename(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let (old_name, rest) = partition(args);
    let (new_name, _) = partition(rest);
    if old_name.is_empty() || new_name.is_empty() {
        ctx.usage("{symbol}timer rename <oldname> <newname>");
        return Ok(());
    }

    if !ctx.state.timers.contains(old_name) {
        ctx.say(&format!("Timer \"{old_name}\" does not exist."));
        return Ok(());
    }
    if !ctx.state.timers.rename(old_name, new_name) {
        ctx.say(&format!("Timer \"{new_name}\" already exists."));
        return Ok(());
    }

    if ctx.state.active_timer.as_deref() == Some(old_name) {
        ctx.state.active_timer = Some(new_name.to_string());
    }
    ctx.mark_changed();
    log::info!(
        "Timer - User {} renamed timer {} to {} in {}",
        ctx.sender.nick,
        old_name,
        new_name,
        ctx.channel
    );
    ctx.say(&format!(
        "Timer \"{old_name}\" has been renamed to \"{new_name}\"."
    ));
    Ok(())
}

fn timer_adjust(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let (seconds, rest) = partition(args);
    let Some(seconds) = parse_seconds(seconds) else {
        ctx.usage("{symbol}timer adjust <seconds> [timer name]");
        return Ok(());
    };
    let (timer_name, _) = partition(rest);
    let Some(name) = resolve_timer(ctx, timer_name) else {
        return Ok(());
    };

    let now = ctx.now();
    update_timer(ctx, &name, |timer| {
        timer.adjust(seconds)?;
        let elapsed = timer.elapsed(now).ok_or(TimerError::NotStarted)?;
        Ok(format!(
            "Updated Timer \"{}\" by {seconds} seconds: {}",
            timer.name,
            format_duration(elapsed)
        ))
    })
}

fn timer_set(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let (seconds, rest) = partition(args);
    let Some(seconds) = parse_seconds(seconds) else {
        ctx.usage("{symbol}timer set <seconds> [timer name]");
        return Ok(());
    };
    let (timer_name, _) = partition(rest);
    let Some(name) = resolve_timer(ctx, timer_name) else {
        return Ok(());
    };

    let now = ctx.now();
    update_timer(ctx, &name, |timer| {
        timer.set(seconds, now)?;
        let elapsed = timer.elapsed(now).ok_or(TimerError::NotStarted)?;
        Ok(format!(
            "Timer \"{}\" has been set to: {}",
            timer.name,
            format_duration(elapsed)
        ))
    })
}

fn timer_adjustsplit(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let (seconds, rest) = partition(args);
    let (split, rest) = partition(rest);
    let seconds = match parse_seconds(seconds) {
        Some(seconds) if !split.is_empty() => seconds,
        _ => {
            ctx.usage("{symbol}timer adjustsplit <seconds> <split name> [timer name]");
            return Ok(());
        }
    };
    let (timer_name, _) = partition(rest);
    let Some(name) = resolve_timer(ctx, timer_name) else {
        return Ok(());
    };

    update_timer(ctx, &name, |timer| {
        let elapsed = timer.adjust_split(split, seconds)?;
        Ok(format!(
            "Split \"{split}\" has been updated: {}",
            format_duration(elapsed)
        ))
    })
}
