//! 角色调试绘制与面板

use glam::{Mat4, Vec3};

use super::Character;
use crate::debug_draw::{DebugDraw, DebugUi, COLOR_BLUE, COLOR_CYAN, COLOR_GREEN};
use crate::physics::SandboxConfig;

/// 调试显示开关
#[derive(Debug, Clone, Default)]
pub struct CharacterDebug {
    /// 角色碰撞球
    pub visible_collision: bool,
    /// 摇摆骨骼总开关
    pub physics_bones: bool,
    /// 每条摇摆链
    pub chains: Vec<bool>,
    /// 碰撞球总开关
    pub collision_bones: bool,
    /// 每组碰撞球
    pub collider_groups: Vec<bool>,
}

impl CharacterDebug {
    /// 各链、各组默认打开，总开关默认关闭
    pub fn for_character(character: &Character) -> Self {
        Self {
            visible_collision: false,
            physics_bones: false,
            chains: vec![true; character.chains.len()],
            collision_bones: false,
            collider_groups: vec![true; character.collider_groups.len()],
        }
    }
}

impl Character {
    /// 输出调试图元与拖尾
    pub fn render_debug(&self, debug: &CharacterDebug, config: &SandboxConfig, elapsed_frame: f32, draw: &mut DebugDraw) {
        if debug.physics_bones {
            for (chain, _) in self
                .chains
                .iter()
                .zip(&debug.chains)
                .filter(|(_, visible)| **visible)
            {
                for pair in chain.bones.windows(2) {
                    let (bone, child) = (&pair[0], &pair[1]);
                    let length = child.local_position.length();
                    draw.draw_axis(bone.world_transform * Mat4::from_scale(Vec3::splat(length)));
                    draw.draw_bone(bone.world_transform, length);
                    draw.draw_sphere(child.world_position(), child.collision_radius, COLOR_GREEN);
                }
            }
        }

        if debug.collision_bones {
            for (group, _) in self
                .collider_groups
                .iter()
                .zip(&debug.collider_groups)
                .filter(|(_, visible)| **visible)
            {
                for bone in &group.bones {
                    let world = self.model.skeleton.node(bone.node).world_transform;
                    draw.draw_axis(world * Mat4::from_scale(Vec3::splat(bone.radius)));
                    draw.draw_sphere(world.transform_point3(bone.offset), bone.radius, COLOR_BLUE);
                }
            }
        }

        if debug.visible_collision {
            let center = self.position + Vec3::new(0.0, config.radius, 0.0);
            draw.draw_sphere(center, config.radius, COLOR_CYAN);
        }

        draw.trail = self.trail.strip_for_frame(elapsed_frame);
    }

    /// 角色面板：基础、移动参数、监视、摇摆骨骼、碰撞球
    pub fn draw_debug_ui(&mut self, ui: &mut dyn DebugUi, debug: &mut CharacterDebug, config: &mut SandboxConfig) {
        if ui.header("Basics") {
            ui.drag_float3("Position", &mut self.position, 0.1);
            let mut degrees = Vec3::new(
                self.angle.x.to_degrees(),
                self.angle.y.to_degrees(),
                self.angle.z.to_degrees(),
            );
            if ui.drag_float3("Angle", &mut degrees, 1.0) {
                self.angle = Vec3::new(degrees.x.to_radians(), degrees.y.to_radians(), degrees.z.to_radians());
            }
            ui.drag_float("Radius", &mut config.radius, 0.01, 0.01, 2.0);
            ui.checkbox("VisibleCollision", &mut debug.visible_collision);
        }

        if ui.header("Movement") {
            ui.drag_float("JumpSpeed", &mut config.jump_speed, 0.1, 0.0, 100.0);
            ui.drag_float("MoveSpeed", &mut config.move_speed, 0.1, 0.0, 100.0);
            let mut turn_degrees = config.turn_speed.to_degrees();
            if ui.drag_float("TurnSpeed", &mut turn_degrees, 1.0, 0.0, 3600.0) {
                config.turn_speed = turn_degrees.to_radians();
            }
            ui.drag_float("Friction", &mut config.friction, 0.01, 0.0, 10.0);
            ui.drag_float("Acceleration", &mut config.acceleration, 0.1, 0.0, 100.0);
            ui.drag_float("GroundAdjust", &mut config.ground_adjust, 0.01, 0.0, 1.0);
            ui.drag_float("SlopeLimit", &mut config.slope_limit, 1.0, 0.0, 90.0);
            ui.drag_float("MaxPhysicsBoneVelocity", &mut config.max_physics_bone_velocity, 0.01, 0.0, 10.0);
        }

        if ui.header("Monitoring") {
            ui.text(&format!("State: {:?}", self.state));
            ui.text(&format!("Velocity: {:.3?}", self.velocity));
            ui.text(&format!("DeltaMove: {:.3?}", self.delta_move));
            let slope = self.ground_normal.dot(Vec3::Y).clamp(-1.0, 1.0).acos().to_degrees();
            ui.text(&format!("SlopeAngle: {:.1}", slope));
            ui.text(&format!("GroundNormal: {:.3?}", self.ground_normal));
            ui.text(&format!("OnGround: {}", self.on_ground));
        }

        if ui.header("PhysicsBones") {
            ui.checkbox("VisiblePhysicsBones", &mut debug.physics_bones);
            for (chain, visible) in self.chains.iter_mut().zip(debug.chains.iter_mut()) {
                ui.checkbox(chain.name, visible);
                for bone in &mut chain.bones {
                    let label = format!("{}/{}", chain.name, self.model.skeleton.node(bone.node).name);
                    ui.drag_float(&label, &mut bone.collision_radius, 0.01, 0.0, 1.0);
                }
            }
        }

        if ui.header("CollisionBones") {
            ui.checkbox("VisibleCollisionBones", &mut debug.collision_bones);
            for (group, visible) in self.collider_groups.iter().zip(debug.collider_groups.iter_mut()) {
                ui.checkbox(group.name, visible);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::tests::character_on_floor;

    #[test]
    fn test_render_respects_toggles() {
        let character = character_on_floor();
        let config = SandboxConfig::default();
        let mut debug = CharacterDebug::for_character(&character);

        let mut draw = DebugDraw::new();
        character.render_debug(&debug, &config, 1.0, &mut draw);
        assert!(draw.primitives.is_empty());

        debug.visible_collision = true;
        debug.physics_bones = true;
        debug.chains = vec![false; character.chains.len()];
        debug.chains[0] = true;
        let mut draw = DebugDraw::new();
        character.render_debug(&debug, &config, 1.0, &mut draw);

        // 7 根骨骼的链：6 对 × (轴, 骨骼, 球) + 角色碰撞球
        assert_eq!(draw.primitives.len(), 6 * 3 + 1);
        assert_eq!(draw.spheres(COLOR_GREEN).count(), 6);
        let (center, radius) = draw.spheres(COLOR_CYAN).next().unwrap();
        assert!(center.abs_diff_eq(character.position + Vec3::new(0.0, config.radius, 0.0), 1e-6));
        assert_eq!(radius, config.radius);
    }

    #[test]
    fn test_collider_spheres_use_offset() {
        let character = character_on_floor();
        let config = SandboxConfig::default();
        let mut debug = CharacterDebug::for_character(&character);
        debug.collision_bones = true;
        debug.collider_groups = vec![false, true, false];

        let mut draw = DebugDraw::new();
        character.render_debug(&debug, &config, 1.0, &mut draw);
        let group = &character.collider_groups[1];
        let expected: Vec<_> = group
            .bones
            .iter()
            .map(|b| (b.world_position(&character.model.skeleton), b.radius))
            .collect();
        let spheres: Vec<_> = draw.spheres(COLOR_BLUE).collect();
        assert_eq!(spheres.len(), expected.len());
        for ((a, ra), (b, rb)) in spheres.iter().zip(&expected) {
            assert!(a.abs_diff_eq(*b, 1e-5));
            assert_eq!(ra, rb);
        }
    }
}
