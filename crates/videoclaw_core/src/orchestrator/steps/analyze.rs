//! Analyze step - turns a script into characters, scenes, props and frames.
//!
//! Parsing is keyword driven. Each known subject has Chinese and English
//! trigger words; the output language follows the script (Chinese names if
//! the script contains CJK characters, English otherwise).
//!
//! Frame plan:
//! - two or more characters: six frames (explore, discover, stare,
//!   approach, transform, friendship)
//! - otherwise: three frames around the lead character

use serde_json::Value;

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::outputs::{AnalysisOutput, Character, FramePlan, Prop, Scene};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::Context;
use crate::state::{StateStore, StepName};

use super::common::to_output;

/// Analyze step for parsing a script.
pub struct AnalyzeStep {
    script: String,
}

impl AnalyzeStep {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl PipelineStep for AnalyzeStep {
    fn name(&self) -> StepName {
        StepName::Analyze
    }

    fn description(&self) -> &str {
        "Analyze script into characters, scenes and frames"
    }

    fn validate_input(&self, _ctx: &Context, _state: &StateStore) -> StepResult<()> {
        if self.script.trim().is_empty() {
            return Err(StepError::invalid_input("script is empty"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, _state: &mut StateStore) -> StepResult<Value> {
        ctx.logger.section("Script Analysis");

        let analysis = parse_script(&self.script);
        ctx.logger.info(&format!(
            "Found {} character(s), {} scene(s), {} prop(s), {} frame(s)",
            analysis.characters.len(),
            analysis.scenes.len(),
            analysis.props.len(),
            analysis.frames.len()
        ));
        for character in &analysis.characters {
            ctx.logger.debug(&format!("  character: {}", character.name));
        }

        to_output(&analysis)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lang {
    Zh,
    En,
}

fn detect_lang(text: &str) -> Lang {
    let cjk = text
        .chars()
        .any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c) || ('\u{3400}'..='\u{4dbf}').contains(&c));
    if cjk {
        Lang::Zh
    } else {
        Lang::En
    }
}

/// Text in both output languages.
struct Text {
    zh: &'static str,
    en: &'static str,
}

impl Text {
    fn get(&self, lang: Lang) -> String {
        match lang {
            Lang::Zh => self.zh,
            Lang::En => self.en,
        }
        .to_string()
    }
}

struct Subject {
    triggers: &'static [&'static str],
    name: Text,
    description: Text,
}

impl Subject {
    fn matches(&self, lowered: &str) -> bool {
        self.triggers.iter().any(|t| lowered.contains(t))
    }
}

struct CharacterDef {
    subject: Subject,
    actions: &'static [Text],
}

const CHARACTERS: &[CharacterDef] = &[
    CharacterDef {
        subject: Subject {
            triggers: &["宇航员", "航天员", "astronaut"],
            name: Text { zh: "宇航员", en: "astronaut" },
            description: Text {
                zh: "身穿白色宇航服的宇航员，头戴头盔",
                en: "an astronaut in a white spacesuit and helmet",
            },
        },
        actions: &[
            Text { zh: "行走", en: "walk" },
            Text { zh: "观察", en: "observe" },
            Text { zh: "惊讶", en: "surprised" },
        ],
    },
    CharacterDef {
        subject: Subject {
            triggers: &["变形金刚", "机器人", "transformer", "robot"],
            name: Text { zh: "变形金刚", en: "transformer" },
            description: Text {
                zh: "高科技机器人，能变形为车辆形态",
                en: "a high-tech robot that can transform into a vehicle",
            },
        },
        actions: &[
            Text { zh: "变形", en: "transform" },
            Text { zh: "站立", en: "stand" },
            Text { zh: "互动", en: "interact" },
        ],
    },
];

const SCENES: &[(Subject, Text)] = &[(
    Subject {
        triggers: &["火星", "mars"],
        name: Text { zh: "火星表面", en: "mars surface" },
        description: Text {
            zh: "红色的火星荒原，有岩石和沙丘",
            en: "a red martian wasteland with rocks and dunes",
        },
    },
    Text { zh: "白天", en: "day" },
)];

const PROPS: &[Subject] = &[Subject {
    triggers: &["基地", "遗迹", "base", "ruins"],
    name: Text { zh: "外星遗迹", en: "alien ruins" },
    description: Text {
        zh: "古老的外星建筑遗迹",
        en: "ancient alien structures",
    },
}];

const DEFAULT_CHARACTER: CharacterDef = CharacterDef {
    subject: Subject {
        triggers: &[],
        name: Text { zh: "主角", en: "protagonist" },
        description: Text {
            zh: "故事主角",
            en: "the main character of the story",
        },
    },
    actions: &[
        Text { zh: "行走", en: "walk" },
        Text { zh: "观察", en: "observe" },
    ],
};

const DEFAULT_SCENE: (Subject, Text) = (
    Subject {
        triggers: &[],
        name: Text { zh: "场景", en: "scene" },
        description: Text {
            zh: "故事发生地点",
            en: "where the story takes place",
        },
    },
    Text { zh: "白天", en: "day" },
);

fn character(def: &CharacterDef, lang: Lang) -> Character {
    Character {
        name: def.subject.name.get(lang),
        description: def.subject.description.get(lang),
        actions: def.actions.iter().map(|a| a.get(lang)).collect(),
    }
}

fn scene(def: &(Subject, Text), lang: Lang) -> Scene {
    Scene {
        name: def.0.name.get(lang),
        description: def.0.description.get(lang),
        time: def.1.get(lang),
    }
}

/// Parse a script into the analyze output.
///
/// Always yields at least one character, one scene and one frame.
pub fn parse_script(script: &str) -> AnalysisOutput {
    let lang = detect_lang(script);
    let lowered = script.to_lowercase();

    let mut characters: Vec<Character> = CHARACTERS
        .iter()
        .filter(|def| def.subject.matches(&lowered))
        .map(|def| character(def, lang))
        .collect();
    if characters.is_empty() {
        characters.push(character(&DEFAULT_CHARACTER, lang));
    }

    let mut scenes: Vec<Scene> = SCENES
        .iter()
        .filter(|def| def.0.matches(&lowered))
        .map(|def| scene(def, lang))
        .collect();
    if scenes.is_empty() {
        scenes.push(scene(&DEFAULT_SCENE, lang));
    }

    let props = PROPS
        .iter()
        .filter(|def| def.matches(&lowered))
        .map(|def| Prop {
            name: def.name.get(lang),
            description: def.description.get(lang),
        })
        .collect();

    let frames = plan_frames(&characters, &scenes[0], lang);

    AnalysisOutput {
        script: script.to_string(),
        characters,
        scenes,
        props,
        frames,
    }
}

fn frame(frame_id: u32, description: String, action: &Text, camera: &Text, lang: Lang) -> FramePlan {
    FramePlan {
        frame_id,
        description,
        action: Some(action.get(lang)),
        camera: Some(camera.get(lang)),
    }
}

const WIDE: Text = Text { zh: "远景", en: "wide shot" };
const MEDIUM: Text = Text { zh: "中景", en: "medium shot" };
const CLOSE: Text = Text { zh: "特写", en: "close-up" };
const FULL: Text = Text { zh: "全景", en: "full shot" };

fn plan_frames(characters: &[Character], scene: &Scene, lang: Lang) -> Vec<FramePlan> {
    let a = &characters[0].name;
    let s = &scene.name;
    let zh = lang == Lang::Zh;

    if let Some(second) = characters.get(1) {
        let b = &second.name;
        let lines = if zh {
            [
                format!("{}独自在{}探索", a, s),
                format!("{}发现了{}", a, b),
                format!("{}和{}相互警惕对视", a, b),
                format!("{}慢慢走近{}", a, b),
                format!("{}变形展示能力", b),
                format!("{}和{}建立友谊", a, b),
            ]
        } else {
            [
                format!("The {} explores the {} alone", a, s),
                format!("The {} discovers the {}", a, b),
                format!("The {} and the {} stare at each other warily", a, b),
                format!("The {} slowly approaches the {}", a, b),
                format!("The {} transforms to show its power", b),
                format!("The {} and the {} become friends", a, b),
            ]
        };
        let beats = [
            (Text { zh: "探索", en: "explore" }, &WIDE),
            (Text { zh: "发现", en: "discover" }, &MEDIUM),
            (Text { zh: "对视", en: "stare" }, &CLOSE),
            (Text { zh: "接近", en: "approach" }, &MEDIUM),
            (Text { zh: "变形", en: "transform" }, &FULL),
            (Text { zh: "友好", en: "friendship" }, &MEDIUM),
        ];
        return lines
            .into_iter()
            .zip(beats.iter())
            .enumerate()
            .map(|(i, (line, (action, camera)))| frame(i as u32 + 1, line, action, camera, lang))
            .collect();
    }

    let lines = if zh {
        [
            format!("{}在{}", a, s),
            format!("{}观察周围环境", a),
            format!("{}发现有趣的事物", a),
        ]
    } else {
        [
            format!("The {} stands in the {}", a, s),
            format!("The {} looks around", a),
            format!("The {} discovers something interesting", a),
        ]
    };
    let beats = [
        (Text { zh: "站立", en: "stand" }, &FULL),
        (Text { zh: "观察", en: "observe" }, &MEDIUM),
        (Text { zh: "发现", en: "discover" }, &CLOSE),
    ];
    lines
        .into_iter()
        .zip(beats.iter())
        .enumerate()
        .map(|(i, (line, (action, camera)))| frame(i as u32 + 1, line, action, camera, lang))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::pipeline::run_step;
    use crate::orchestrator::testing::{test_context, TestProject};
    use crate::orchestrator::types::ReportStatus;

    #[test]
    fn chinese_script_with_two_characters_plans_six_frames() {
        let out = parse_script("宇航员在火星基地遇到了一个变形金刚");

        let names: Vec<&str> = out.characters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["宇航员", "变形金刚"]);
        assert_eq!(out.scenes[0].name, "火星表面");
        assert_eq!(out.props[0].name, "外星遗迹");
        assert_eq!(out.frames.len(), 6);
        assert_eq!(out.frames[1].description, "宇航员发现了变形金刚");
        assert_eq!(out.frames[0].camera.as_deref(), Some("远景"));
    }

    #[test]
    fn english_script_is_case_insensitive() {
        let out = parse_script("An Astronaut lands on Mars.");

        assert_eq!(out.characters.len(), 1);
        assert_eq!(out.characters[0].name, "astronaut");
        assert_eq!(out.scenes[0].name, "mars surface");
        assert!(out.props.is_empty());
        assert_eq!(out.frames.len(), 3);
        assert_eq!(out.frames[0].description, "The astronaut stands in the mars surface");
    }

    #[test]
    fn unrecognised_script_gets_defaults() {
        let out = parse_script("A quiet morning.");
        assert_eq!(out.characters[0].name, "protagonist");
        assert_eq!(out.scenes[0].name, "scene");
        assert_eq!(out.frames.len(), 3);

        let out = parse_script("清晨");
        assert_eq!(out.characters[0].name, "主角");
    }

    #[test]
    fn empty_script_is_rejected_without_touching_state() {
        let project = TestProject::new();
        let ctx = test_context(&project);
        let mut state = project.state();

        let report = run_step(&AnalyzeStep::new("   "), &ctx, &mut state);
        assert!(report.refused);
        assert!(state.get_step(StepName::Analyze).is_none());
    }

    #[test]
    fn records_analysis_output() {
        let project = TestProject::new();
        let ctx = test_context(&project);
        let mut state = project.state();

        let report = run_step(&AnalyzeStep::new("astronaut meets a robot"), &ctx, &mut state);
        assert_eq!(report.status, ReportStatus::Success);

        let out: AnalysisOutput = state.completed_output(StepName::Analyze).unwrap().unwrap();
        assert_eq!(out.characters.len(), 2);
        assert_eq!(out.script, "astronaut meets a robot");
    }
}
