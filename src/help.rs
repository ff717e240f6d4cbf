//! Overview and per-command help rendering.
//!
//! Rendering is pure: both entry points return a tagged string (see
//! [`crate::style`]) and the dispatcher pushes it through the console
//! sink.  Called twice against an unchanged registry, they return
//! identical text.

use crate::registry::Registry;
use crate::util::ucfirst;

/// Fallback description for commands registered without one.
const NO_DESC: &str = "No description for the command";

/// Renders the application overview: optional error banner, description
/// with version suffix, usage line, and the alphabetical command table.
pub fn render_overview(
    desc: &str,
    version: &str,
    script: &str,
    registry: &Registry,
    err: Option<&str>,
) -> String {
    let mut help = String::new();

    if let Some(err) = err {
        help.push_str(&format!("<red>ERROR</red>: {err}\n\n"));
    }

    let mut headline = ucfirst(desc);
    if !version.is_empty() {
        headline.push_str(&format!("(<red>v{version}</red>)"));
    }

    help.push_str(&format!(
        "{headline}\n\n<comment>Usage:</comment> <cyan>{script} COMMAND -h</cyan>\n<comment>Commands:</comment>\n"
    ));

    let width = registry.key_width();
    for binding in registry.list() {
        let desc = match &binding.meta {
            Some(meta) if !meta.desc.is_empty() => ucfirst(&meta.desc),
            _ => NO_DESC.to_owned(),
        };
        help.push_str(&format!(
            "  <green>{name:<width$}</green>   {desc}\n",
            name = binding.name,
        ));
    }

    help.push_str(&format!(
        "\nFor command usage please run: <cyan>{script} COMMAND -h</cyan>"
    ));
    help
}

/// Renders per-command help for `name`.
///
/// Without registered metadata this is a generic notice plus the generic
/// usage line.  With metadata: description, custom usage (generic form
/// when unset), and the long-help body with trailing newlines trimmed.
/// Placeholders are substituted only when the text contains `{{`.
pub fn render_command(script: &str, workdir: &str, name: &str, registry: &Registry) -> String {
    let full_cmd = format!("{script} {name}");
    let generic_usage = format!("{full_cmd} [args ...] [--opts ...]");

    let meta = registry.lookup(name).and_then(|b| b.meta.as_ref());
    let Some(meta) = meta else {
        return format!("{NO_DESC}\n<comment>Usage:</comment> \n  {generic_usage}");
    };

    let usage = if meta.usage.is_empty() {
        generic_usage
    } else {
        meta.usage.clone()
    };
    let body = meta.help.trim_end_matches('\n');

    let mut nodes = vec![
        ucfirst(&meta.desc),
        format!("<comment>Usage:</comment> \n  {usage}\n"),
    ];
    nodes.push(if body.is_empty() {
        String::new()
    } else {
        format!("{body}\n")
    });

    let help = nodes.join("\n");
    if help.contains("{{") {
        substitute_placeholders(&help, name, &full_cmd, workdir, script)
    } else {
        help
    }
}

/// Replaces the recognized `{{…}}` tokens in long-help text.
fn substitute_placeholders(
    text: &str,
    command: &str,
    full_cmd: &str,
    workdir: &str,
    script: &str,
) -> String {
    text.replace("{{command}}", command)
        .replace("{{fullCmd}}", full_cmd)
        .replace("{{workDir}}", workdir)
        .replace("{{pwdDir}}", workdir)
        .replace("{{script}}", script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Handler, HandlerResult, Registry};
    use crate::app::App;

    fn noop(_: &mut App) -> HandlerResult {
        Ok(0)
    }

    fn sample_registry() -> Registry {
        let mut reg = Registry::new();
        reg.register("sync", Handler::Func(noop), Some("Pull remote state".into()))
            .unwrap();
        reg.register("greet", Handler::Func(noop), Some("say hello".into()))
            .unwrap();
        reg.register("bare", Handler::Func(noop), None).unwrap();
        reg
    }

    #[test]
    fn overview_lists_commands_alphabetically() {
        let reg = sample_registry();
        let text = render_overview("demo app", "1.0", "app", &reg, None);
        let bare = text.find("bare").unwrap();
        let greet = text.find("greet").unwrap();
        let sync = text.find("sync").unwrap();
        assert!(bare < greet && greet < sync);
    }

    #[test]
    fn overview_capitalises_and_falls_back() {
        let reg = sample_registry();
        let text = render_overview("demo app", "", "app", &reg, None);
        assert!(text.starts_with("Demo app\n"));
        assert!(text.contains("Say hello"));
        assert!(text.contains(NO_DESC));
    }

    #[test]
    fn overview_version_suffix() {
        let reg = Registry::new();
        let text = render_overview("demo", "0.2.1", "app", &reg, None);
        assert!(text.contains("Demo(<red>v0.2.1</red>)"));
    }

    #[test]
    fn overview_error_banner_first() {
        let reg = Registry::new();
        let text = render_overview("demo", "", "app", &reg, Some("The command 'foo' is not exists!"));
        assert!(text.starts_with("<red>ERROR</red>: The command 'foo' is not exists!\n\n"));
    }

    #[test]
    fn overview_pads_to_key_width() {
        let mut reg = Registry::new();
        reg.register("ls", Handler::Func(noop), Some("List".into())).unwrap();
        let text = render_overview("demo", "", "app", &reg, None);
        // "ls" padded to the 12-column floor before the gap.
        assert!(text.contains("<green>ls          </green>   List"));
    }

    #[test]
    fn overview_is_stable() {
        let reg = sample_registry();
        let a = render_overview("demo", "1.0", "app", &reg, None);
        let b = render_overview("demo", "1.0", "app", &reg, None);
        assert_eq!(a, b);
    }

    #[test]
    fn command_help_without_meta_is_generic() {
        let reg = sample_registry();
        let text = render_command("app", "/work", "bare", &reg);
        assert!(text.starts_with(NO_DESC));
        assert!(text.contains("app bare [args ...] [--opts ...]"));
    }

    #[test]
    fn command_help_unknown_name_is_generic() {
        let reg = Registry::new();
        let text = render_command("app", "/work", "ghost", &reg);
        assert!(text.starts_with(NO_DESC));
    }

    #[test]
    fn command_help_custom_usage_wins() {
        let mut reg = Registry::new();
        let meta = crate::registry::CommandMeta {
            desc: "sync things".into(),
            usage: "app sync <remote>".into(),
            help: String::new(),
        };
        reg.register("sync", Handler::Func(noop), Some(meta)).unwrap();
        let text = render_command("app", "/work", "sync", &reg);
        assert!(text.contains("app sync <remote>"));
        assert!(!text.contains("[args ...]"));
    }

    #[test]
    fn command_help_trims_trailing_blank_lines() {
        let mut reg = Registry::new();
        let meta = crate::registry::CommandMeta {
            desc: "sync".into(),
            usage: String::new(),
            help: "body line\n\n\n".into(),
        };
        reg.register("sync", Handler::Func(noop), Some(meta)).unwrap();
        let text = render_command("app", "/work", "sync", &reg);
        assert!(text.ends_with("body line\n"));
    }

    #[test]
    fn placeholders_substituted() {
        let mut reg = Registry::new();
        let meta = crate::registry::CommandMeta {
            desc: "sync".into(),
            usage: String::new(),
            help: "Run {{fullCmd}} now from {{workDir}} ({{script}}, {{command}})".into(),
        };
        reg.register("sync", Handler::Func(noop), Some(meta)).unwrap();
        let text = render_command("app", "/work", "sync", &reg);
        assert!(text.contains("Run app sync now from /work (app, sync)"));
    }

    #[test]
    fn pwd_dir_alias_substituted() {
        let mut reg = Registry::new();
        let meta = crate::registry::CommandMeta {
            desc: "sync".into(),
            usage: String::new(),
            help: "in {{pwdDir}}".into(),
        };
        reg.register("sync", Handler::Func(noop), Some(meta)).unwrap();
        let text = render_command("app", "/work", "sync", &reg);
        assert!(text.contains("in /work"));
    }

    #[test]
    fn no_substitution_without_marker() {
        let mut reg = Registry::new();
        let meta = crate::registry::CommandMeta {
            desc: "sync".into(),
            usage: String::new(),
            help: "plain {command} text".into(),
        };
        reg.register("sync", Handler::Func(noop), Some(meta)).unwrap();
        let text = render_command("app", "/work", "sync", &reg);
        assert!(text.contains("plain {command} text"));
    }
}
