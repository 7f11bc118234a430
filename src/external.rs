use std::path::PathBuf;
use std::sync::mpsc;

use crate::animations::Params;

/// One control message from outside: an optional animation switch plus
/// a parameter patch for the active instance. Any JSON object works —
/// `animation` is peeled off, every other key lands in the patch:
///
/// ```text
/// {"speed": 2.0, "color_mode": "fire"}
/// {"animation": "spirograph", "trail_fade": 0.9}
/// ```
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ControlMsg {
    pub animation: Option<String>,
    #[serde(flatten)]
    pub params: Params,
}

pub enum ControlSource {
    Stdin,
    File(PathBuf),
}

/// Spawn a background reader delivering control messages. Patches are
/// drained and applied by the driver at the loop boundary, so they
/// become visible to the very next render.
pub fn spawn_reader(source: ControlSource) -> mpsc::Receiver<ControlMsg> {
    let (tx, rx) = mpsc::channel::<ControlMsg>();

    match source {
        ControlSource::Stdin => {
            std::thread::spawn(move || {
                use std::io::BufRead;
                let stdin = std::io::BufReader::new(std::io::stdin());
                for line in stdin.lines() {
                    match line {
                        Ok(l) => {
                            if let Ok(msg) = serde_json::from_str::<ControlMsg>(&l)
                                && tx.send(msg).is_err()
                            {
                                break;
                            }
                        }
                        Err(_) => break,
                    }
                }
            });
        }
        ControlSource::File(path) => {
            std::thread::spawn(move || {
                // Apply the file once on startup if it already exists
                if let Ok(contents) = std::fs::read_to_string(&path)
                    && let Some(line) = contents.lines().rfind(|l| !l.trim().is_empty())
                    && let Ok(msg) = serde_json::from_str::<ControlMsg>(line)
                    && tx.send(msg).is_err()
                {
                    return;
                }

                let (file_tx, file_rx) = mpsc::channel();
                let Ok(mut watcher) = notify::recommended_watcher(move |res| {
                    let _ = file_tx.send(res);
                }) else {
                    return;
                };
                if notify::Watcher::watch(&mut watcher, &path, notify::RecursiveMode::NonRecursive)
                    .is_err()
                {
                    return;
                }
                while let Ok(Ok(_event)) = file_rx.recv() {
                    if let Ok(contents) = std::fs::read_to_string(&path)
                        && let Some(line) = contents.lines().rfind(|l| !l.trim().is_empty())
                        && let Ok(msg) = serde_json::from_str::<ControlMsg>(line)
                        && tx.send(msg).is_err()
                    {
                        break;
                    }
                }
            });
        }
    }

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_key_is_peeled_off_the_patch() {
        let msg: ControlMsg =
            serde_json::from_str(r#"{"animation": "fractal", "zoom_speed": 8.0}"#).unwrap();
        assert_eq!(msg.animation.as_deref(), Some("fractal"));
        assert_eq!(msg.params.number("zoom_speed", 0.0), 8.0);
        assert!(msg.params.get("animation").is_none());
    }

    #[test]
    fn test_pure_patch_has_no_switch() {
        let msg: ControlMsg = serde_json::from_str(r#"{"speed": 0.5, "trails": true}"#).unwrap();
        assert!(msg.animation.is_none());
        assert_eq!(msg.params.number("speed", 0.0), 0.5);
        assert!(msg.params.flag("trails", false));
    }
}
