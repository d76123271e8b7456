//! 无窗口沙盒：灰盒舞台 + 人偶，按固定 60fps 回放一段输入

use std::process::ExitCode;

use avatar_engine::character::mannequin::build_mannequin;
use avatar_engine::character::InputKeys;
use avatar_engine::scene::{greybox_stage, CharacterControlScene};
use avatar_engine::Result;
use glam::Vec2;

const DT: f32 = 1.0 / 60.0;

/// 输入片段：(帧数, 摇杆, 首帧按键)
const SCRIPT: &[(u32, Vec2, InputKeys)] = &[
    (30, Vec2::ZERO, InputKeys::empty()),
    // 向前跑
    (90, Vec2::new(0.0, 1.0), InputKeys::empty()),
    // 边跑边跳
    (60, Vec2::new(0.0, 1.0), InputKeys::JUMP),
    // 转向右
    (45, Vec2::new(1.0, 0.0), InputKeys::empty()),
    (30, Vec2::ZERO, InputKeys::empty()),
    // 四段连招
    (20, Vec2::ZERO, InputKeys::ATTACK),
    (20, Vec2::ZERO, InputKeys::ATTACK),
    (30, Vec2::ZERO, InputKeys::ATTACK),
    (90, Vec2::ZERO, InputKeys::ATTACK),
    // 原地跳
    (90, Vec2::ZERO, InputKeys::JUMP),
];

fn run() -> Result<()> {
    let mut scene = CharacterControlScene::new(greybox_stage()?, build_mannequin()?)?;

    let mut frame = 0u32;
    let mut state = scene.character.state();
    for &(frames, axis, keys) in SCRIPT {
        for i in 0..frames {
            let pressed = if i == 0 { keys } else { InputKeys::empty() };
            scene.input.update(axis, pressed);
            scene.update(DT);
            frame += 1;

            let current = scene.character.state();
            if current != state {
                log::info!(
                    "[沙盒] 帧 {:4}: {:?} -> {:?} 位置 {:.2?}",
                    frame,
                    state,
                    current,
                    scene.character.position
                );
                state = current;
            }
        }
    }

    let draw = scene.render(DT);
    log::info!(
        "[沙盒] 结束: {} 帧, 位置 {:.2?}, 接地 {}, 拖尾顶点 {} 个",
        frame,
        scene.character.position,
        scene.character.on_ground,
        draw.trail.len()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("[沙盒] {}", e);
            ExitCode::FAILURE
        }
    }
}
