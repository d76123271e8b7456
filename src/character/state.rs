//! 移动 / 战斗状态机
//!
//! 每帧：若请求了新状态，先执行旧状态的退出处理，再切换，再执行新状态的进入处理；
//! 然后无论是否切换都执行当前状态的更新处理。
//! 状态内请求的切换在下一帧生效。

use glam::Vec3;

use super::{Character, CharacterEnv, InputKeys, InputState};
use crate::collision::ray_intersect_model;
use crate::convert_to_game_frame;

/// 角色状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CharacterState {
    #[default]
    Idle,
    Move,
    Jump,
    Air,
    Landing,
    Combo1,
    Combo2,
    Combo3,
    Combo4,
}

impl CharacterState {
    /// 是否处于连招中
    #[inline]
    pub fn is_combo(self) -> bool {
        matches!(self, Self::Combo1 | Self::Combo2 | Self::Combo3 | Self::Combo4)
    }

    /// 连招中可以接下一段的帧（60fps），超过该帧才真正切换
    pub fn combo_shift_frame(self) -> f32 {
        match self {
            Self::Combo1 => 15.0,
            Self::Combo2 => 17.0,
            Self::Combo3 => 35.0,
            Self::Combo4 => -1.0,
            _ => NO_SHIFT_FRAME,
        }
    }

    /// 连招的下一段
    pub fn next_combo(self) -> Self {
        match self {
            Self::Combo1 => Self::Combo2,
            Self::Combo2 => Self::Combo3,
            Self::Combo3 => Self::Combo4,
            _ => Self::Combo1,
        }
    }
}

/// 非连招状态的接招帧：输入立即生效
const NO_SHIFT_FRAME: f32 = 10000.0;
/// 接招帧超过该值视为没有限制
const UNLIMITED_SHIFT_FRAME: f32 = 9999.0;
/// 摇杆超过该长度视为移动输入
const MOVE_INPUT_THRESHOLD: f32 = 0.5;
/// 起跳时水平速度保留比例
const JUMP_HORIZONTAL_DAMPING: f32 = 0.5;
/// 高速着地判定（垂直速度）
const FAST_LANDING_SPEED: f32 = -5.0;
/// 空中提前着地检测的向下余量
const LANDING_LOOKAHEAD: f32 = 0.5;

/// 状态切换监听（默认什么都不做）
pub trait StateListener {
    /// 旧状态的退出处理完成后调用
    fn on_state_exit(&mut self, _state: CharacterState) {}
    /// 新状态的进入处理完成后调用
    fn on_state_enter(&mut self, _state: CharacterState) {}
}

impl StateListener for () {}

impl Character {
    /// 请求切换状态，下一帧生效
    #[inline]
    pub fn change_state(&mut self, state: CharacterState) {
        self.next_state = state;
    }

    /// 当前状态
    #[inline]
    pub fn state(&self) -> CharacterState {
        self.state
    }

    /// 已请求、尚未生效的状态
    #[inline]
    pub fn next_state(&self) -> CharacterState {
        self.next_state
    }

    /// 状态机每帧入口
    pub fn update_state_machine(
        &mut self,
        elapsed_time: f32,
        input: &InputState,
        env: &CharacterEnv,
        listener: &mut dyn StateListener,
    ) {
        if self.state != self.next_state {
            log::debug!("[角色] 状态切换: {:?} -> {:?}", self.state, self.next_state);

            self.state_exit(input, env);
            listener.on_state_exit(self.state);

            self.state = self.next_state;

            self.state_enter(input, env);
            listener.on_state_enter(self.state);
        }
        self.state_update(elapsed_time, input, env);
    }

    fn state_enter(&mut self, input: &InputState, env: &CharacterEnv) {
        let clips = self.clips;
        match self.state {
            CharacterState::Idle => self.play(clips.idle, 0.1, true, false),
            CharacterState::Move => self.play(clips.run, 0.1, true, false),
            CharacterState::Jump => {
                self.velocity.x *= JUMP_HORIZONTAL_DAMPING;
                self.velocity.z *= JUMP_HORIZONTAL_DAMPING;
                self.velocity.y = env.config.jump_speed;
                self.change_state(CharacterState::Air);
            }
            CharacterState::Air => {}
            CharacterState::Landing => {
                let fast = self.velocity.y < FAST_LANDING_SPEED;
                if input.axis_length > MOVE_INPUT_THRESHOLD {
                    if fast {
                        self.play(clips.run_landing_fast, 0.3, false, true);
                    } else {
                        self.play(clips.run_landing, 0.2, false, true);
                    }
                } else if fast {
                    self.play(clips.idle_land_fast, 0.2, false, true);
                } else {
                    self.play(clips.idle_land, 0.2, false, true);
                }
            }
            CharacterState::Combo1 => self.play(clips.combo[0], 0.1, false, true),
            CharacterState::Combo2 => self.play(clips.combo[1], 0.1, false, true),
            CharacterState::Combo3 => self.play(clips.combo[2], 0.1, false, true),
            CharacterState::Combo4 => self.play(clips.combo[3], 0.1, false, true),
        }
    }

    fn state_update(&mut self, elapsed_time: f32, input: &InputState, env: &CharacterEnv) {
        self.apply_foot_ik = false;

        match self.state {
            CharacterState::Idle => {
                self.apply_foot_ik = true;

                if input.axis_length > MOVE_INPUT_THRESHOLD {
                    self.change_state(CharacterState::Move);
                }
                if input.is_down(InputKeys::JUMP) {
                    self.change_state(CharacterState::Jump);
                }
                self.input_combo(input);
            }
            CharacterState::Move => {
                self.input_movement(elapsed_time, input, env.config);

                if input.axis_length <= MOVE_INPUT_THRESHOLD {
                    self.change_state(CharacterState::Idle);
                }
                if !self.on_ground {
                    self.change_state(CharacterState::Air);
                }
                if input.is_down(InputKeys::JUMP) {
                    self.change_state(CharacterState::Jump);
                }
                self.input_combo(input);
            }
            CharacterState::Jump | CharacterState::Air => {
                self.input_movement(elapsed_time, input, env.config);
                self.update_air(elapsed_time, env);
            }
            CharacterState::Landing => {
                self.input_movement(elapsed_time, input, env.config);

                if !self.player.is_playing() {
                    if input.axis_length > MOVE_INPUT_THRESHOLD {
                        self.change_state(CharacterState::Move);
                    } else {
                        self.change_state(CharacterState::Idle);
                    }
                }
            }
            CharacterState::Combo1 | CharacterState::Combo2 | CharacterState::Combo3 | CharacterState::Combo4 => {
                self.input_movement(elapsed_time, input, env.config);
                self.input_combo(input);
            }
        }
    }

    fn state_exit(&mut self, input: &InputState, env: &CharacterEnv) {
        match self.state {
            CharacterState::Landing => {
                // 根运动着地结束后恢复速度控制
                let speed = env.config.move_speed * input.axis_length;
                self.velocity.x = self.desired_direction.x * speed;
                self.velocity.z = self.desired_direction.z * speed;
            }
            state if state.is_combo() => self.combo = false,
            _ => {}
        }
    }

    /// 空中：按垂直速度选择动画，下落时检测着地
    fn update_air(&mut self, elapsed_time: f32, env: &CharacterEnv) {
        let clips = self.clips;
        let vy = self.velocity.y;
        let clip = if vy > 10.0 {
            clips.jump_take_off
        } else if vy > 5.0 {
            clips.jump_goes_up2
        } else if vy > 0.5 {
            clips.jump_goes_up
        } else if vy < -5.0 {
            clips.jump_goes_down2
        } else if vy < -0.5 {
            clips.jump_goes_down
        } else {
            clips.jump_peak
        };
        self.play(clip, 0.1, true, false);

        if vy > 0.0 {
            return;
        }
        if self.on_ground {
            self.change_state(CharacterState::Idle);
            return;
        }

        // 向下射线，提前进入着地
        let ray_start = self.position + Vec3::new(0.0, env.config.radius, 0.0);
        let ray_end = self.position + Vec3::new(0.0, vy * elapsed_time - LANDING_LOOKAHEAD, 0.0);
        if ray_intersect_model(ray_start, ray_end, env.stage).is_some() {
            self.change_state(CharacterState::Landing);
        }
    }

    /// 连招输入
    ///
    /// 接招帧之前按下攻击则记下连招，到达接招帧时切换到下一段；
    /// 动画播完仍未接招则回到待机。
    fn input_combo(&mut self, input: &InputState) {
        let shift_frame = self.state.combo_shift_frame();
        let frame = convert_to_game_frame(self.player.seconds());

        if !self.combo && input.is_down(InputKeys::ATTACK) && frame < shift_frame {
            self.combo = true;
        }

        if self.combo && (frame >= shift_frame || shift_frame > UNLIMITED_SHIFT_FRAME) {
            self.change_state(self.state.next_combo());
            self.combo = false;
        }

        if !self.player.is_playing() {
            self.combo = false;
            self.change_state(CharacterState::Idle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::tests::{character_on_floor, floor};
    use crate::physics::SandboxConfig;
    use glam::Vec2;

    /// 记录切换顺序
    #[derive(Default)]
    struct Recorder {
        events: Vec<(&'static str, CharacterState)>,
    }

    impl StateListener for Recorder {
        fn on_state_exit(&mut self, state: CharacterState) {
            self.events.push(("exit", state));
        }
        fn on_state_enter(&mut self, state: CharacterState) {
            self.events.push(("enter", state));
        }
    }

    impl Recorder {
        fn transitions(&self) -> Vec<(CharacterState, CharacterState)> {
            self.events
                .chunks(2)
                .filter_map(|pair| match pair {
                    [("exit", from), ("enter", to)] => Some((*from, *to)),
                    _ => None,
                })
                .collect()
        }
    }

    const DT: f32 = 1.0 / 60.0;

    fn step(
        character: &mut Character,
        input: &mut InputState,
        env: &CharacterEnv,
        recorder: &mut Recorder,
        axis: Vec2,
        keys: InputKeys,
    ) {
        input.update(axis, keys);
        character.update_with_listener(DT, input, env, recorder);
    }

    #[test]
    fn test_idle_to_combo1_ordering() {
        let stage = floor();
        let config = SandboxConfig::default();
        let env = CharacterEnv { stage: &stage, look_targets: &[], config: &config };
        let mut character = character_on_floor();
        let mut input = InputState::default();
        let mut recorder = Recorder::default();

        // 攻击输入在待机更新中被接受，切换在下一帧发生
        step(&mut character, &mut input, &env, &mut recorder, Vec2::ZERO, InputKeys::ATTACK);
        assert_eq!(character.state(), CharacterState::Idle);
        assert_eq!(character.next_state(), CharacterState::Combo1);
        assert!(recorder.events.is_empty());

        step(&mut character, &mut input, &env, &mut recorder, Vec2::ZERO, InputKeys::empty());
        assert_eq!(
            recorder.events,
            vec![("exit", CharacterState::Idle), ("enter", CharacterState::Combo1)]
        );
        assert_eq!(character.state(), CharacterState::Combo1);
        assert_eq!(character.player.index(), Some(character.clips.combo[0]));
        assert!(character.player.root_motion_enabled());

        // 没有新请求时不再触发
        step(&mut character, &mut input, &env, &mut recorder, Vec2::ZERO, InputKeys::empty());
        assert_eq!(recorder.events.len(), 2);
    }

    #[test]
    fn test_buffered_attack_waits_for_shift_frame() {
        let stage = floor();
        let config = SandboxConfig::default();
        let env = CharacterEnv { stage: &stage, look_targets: &[], config: &config };
        let mut character = character_on_floor();
        let mut input = InputState::default();
        let mut recorder = Recorder::default();

        step(&mut character, &mut input, &env, &mut recorder, Vec2::ZERO, InputKeys::ATTACK);
        step(&mut character, &mut input, &env, &mut recorder, Vec2::ZERO, InputKeys::empty());
        assert_eq!(character.state(), CharacterState::Combo1);

        // Combo1 第 3 帧按下攻击，只记下连招
        for _ in 0..3 {
            step(&mut character, &mut input, &env, &mut recorder, Vec2::ZERO, InputKeys::empty());
        }
        step(&mut character, &mut input, &env, &mut recorder, Vec2::ZERO, InputKeys::ATTACK);
        assert!(character.combo);
        for _ in 0..4 {
            step(&mut character, &mut input, &env, &mut recorder, Vec2::ZERO, InputKeys::empty());
        }
        assert_eq!(character.state(), CharacterState::Combo1);

        // 到达第 15 帧后进入 Combo2
        for _ in 0..12 {
            step(&mut character, &mut input, &env, &mut recorder, Vec2::ZERO, InputKeys::empty());
        }
        assert_eq!(character.state(), CharacterState::Combo2);
        assert!(!character.combo);

        // 不再输入，动画播完回到待机
        for _ in 0..70 {
            step(&mut character, &mut input, &env, &mut recorder, Vec2::ZERO, InputKeys::empty());
        }
        assert_eq!(character.state(), CharacterState::Idle);
        assert_eq!(
            recorder.transitions(),
            vec![
                (CharacterState::Idle, CharacterState::Combo1),
                (CharacterState::Combo1, CharacterState::Combo2),
                (CharacterState::Combo2, CharacterState::Idle),
            ]
        );
    }

    #[test]
    fn test_combo4_never_chains() {
        assert!(CharacterState::Combo4.combo_shift_frame() < 0.0);
        assert_eq!(CharacterState::Idle.next_combo(), CharacterState::Combo1);
        assert_eq!(CharacterState::Combo3.next_combo(), CharacterState::Combo4);
        assert!(!CharacterState::Landing.is_combo());
    }

    #[test]
    fn test_jump_air_landing_idle() {
        let stage = floor();
        let config = SandboxConfig::default();
        let env = CharacterEnv { stage: &stage, look_targets: &[], config: &config };
        let mut character = character_on_floor();
        let mut input = InputState::default();
        let mut recorder = Recorder::default();

        step(&mut character, &mut input, &env, &mut recorder, Vec2::ZERO, InputKeys::empty());
        assert!(character.on_ground);

        step(&mut character, &mut input, &env, &mut recorder, Vec2::ZERO, InputKeys::JUMP);
        let mut max_height = 0.0f32;
        for _ in 0..150 {
            step(&mut character, &mut input, &env, &mut recorder, Vec2::ZERO, InputKeys::empty());
            max_height = max_height.max(character.position.y);
        }

        assert_eq!(
            recorder.transitions(),
            vec![
                (CharacterState::Idle, CharacterState::Jump),
                (CharacterState::Jump, CharacterState::Air),
                (CharacterState::Air, CharacterState::Landing),
                (CharacterState::Landing, CharacterState::Idle),
            ]
        );
        assert!(max_height > 0.5, "max height {}", max_height);
        assert!(character.on_ground);
        assert!(character.position.y.abs() < 1e-3);
    }

    #[test]
    fn test_walk_off_ledge_enters_air() {
        let stage = floor();
        let config = SandboxConfig::default();
        let env = CharacterEnv { stage: &stage, look_targets: &[], config: &config };
        let mut character = character_on_floor();
        let mut input = InputState::default();
        let mut recorder = Recorder::default();

        // 地面外缘在 z = 50
        character.position.z = 48.0;
        for _ in 0..90 {
            step(&mut character, &mut input, &env, &mut recorder, Vec2::Y, InputKeys::empty());
        }
        let transitions = recorder.transitions();
        assert_eq!(transitions[0], (CharacterState::Idle, CharacterState::Move));
        assert!(transitions.contains(&(CharacterState::Move, CharacterState::Air)));
        assert!(character.position.y < -0.5);
    }
}
