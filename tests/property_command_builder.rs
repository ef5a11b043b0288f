// tests/property_command_builder.rs

use proptest::prelude::*;

use fedorable::command::CommandBuilder;
use fedorable::config::defaults::builtin_config;
use fedorable::config::ConfigSnapshot;

fn builder() -> CommandBuilder {
    let cfg = builtin_config();
    CommandBuilder::new(&cfg.settings, &cfg.catalogue)
}

// One bool per catalogue entry, in catalogue order.
fn snapshot_strategy() -> impl Strategy<Value = (Vec<bool>, Vec<bool>)> {
    let cfg = builtin_config();
    (
        proptest::collection::vec(any::<bool>(), cfg.catalogue.tasks().len()),
        proptest::collection::vec(any::<bool>(), cfg.catalogue.options().len()),
    )
}

fn snapshot_from(builder: &CommandBuilder, tasks: &[bool], options: &[bool]) -> ConfigSnapshot {
    let cat = builder.catalogue();
    let mut snap = ConfigSnapshot::defaults(cat);
    for (entry, enabled) in cat.tasks().iter().zip(tasks) {
        snap = snap.with_task(entry.key.clone(), *enabled);
    }
    for (entry, enabled) in cat.options().iter().zip(options) {
        snap = snap.with_option(entry.key.clone(), *enabled);
    }
    snap
}

proptest! {
    #[test]
    fn build_is_deterministic((tasks, options) in snapshot_strategy()) {
        let b = builder();
        let snap = snapshot_from(&b, &tasks, &options);
        let first = b.build(&snap).unwrap();
        let second = b.build(&snap.clone()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn negated_task_flags_match_selection((tasks, options) in snapshot_strategy()) {
        let b = builder();
        let snap = snapshot_from(&b, &tasks, &options);
        let spec = b.build(&snap).unwrap();
        let flags = spec.flags();

        let mut last_position = None;
        for (entry, enabled) in b.catalogue().tasks().iter().zip(&tasks) {
            let flag = format!("--no-{}", entry.key.replace('_', "-"));
            let positions: Vec<_> = flags
                .iter()
                .enumerate()
                .filter(|(_, f)| **f == flag)
                .map(|(i, _)| i)
                .collect();

            if *enabled {
                prop_assert!(positions.is_empty());
            } else {
                prop_assert_eq!(positions.len(), 1);
                if let Some(prev) = last_position {
                    prop_assert!(positions[0] > prev);
                }
                last_position = Some(positions[0]);
            }
        }

        let option_count = options.iter().filter(|o| **o).count();
        let task_count = tasks.iter().filter(|t| !**t).count();
        prop_assert_eq!(flags.len(), task_count + option_count);
        prop_assert!(flags[..task_count].iter().all(|f| f.starts_with("--no-")));
        prop_assert_eq!(spec.program(), "pkexec");
    }
}
