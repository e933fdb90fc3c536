//! The demo scene and the scripted edit sequence run against it.

use sseditor_core::math::{Quat, Vec3, quat_from_rotation_y};
use sseditor_core::operation::Operation;
use sseditor_core::operation::scene_ops::{self, AddChild, AddControl, EnableControls};
use sseditor_core::scene::{
    AudioSource, Control, Light, LightId, NodeId, NodePayload, Presentable, Scene, SceneNode,
    Transform,
};

fn point_position() -> Vec3 {
    Vec3::new(0.0, 3.0, 0.0)
}

fn spot_direction() -> Vec3 {
    Vec3::new(0.0, -1.0, 0.0)
}

fn sun_direction() -> Vec3 {
    Vec3::new(0.3, -1.0, 0.2)
}

fn spawn_location() -> Vec3 {
    Vec3::new(0.0, 0.0, -3.0)
}

/// Handles into the demo scene.
#[derive(Debug)]
pub struct DemoScene {
    pub scene: Scene,
    pub lamp: NodeId,
    pub point: LightId,
    pub spot: LightId,
    pub sun: LightId,
    pub speaker: NodeId,
    pub spawn: NodeId,
}

/// Builds a small level: a lamp with a point light, a spot light on a
/// stage, a sun, an ambient fill, a speaker and a spawn marker.
pub fn build(name: &str) -> DemoScene {
    let mut scene = Scene::new(name);
    let root = scene.root();

    // Every parent here exists, so spawning cannot fail.
    let spawn_node = |scene: &mut Scene, node: SceneNode| {
        let id = node.id();
        if let Err(err) = scene.spawn(root, node) {
            log::error!("Demo scene: {err}");
        }
        id
    };

    let lamp = spawn_node(
        &mut scene,
        SceneNode::new("lamp")
            .with_transform(Transform::from_translation(point_position()))
            .with_control(Control::new("flicker")),
    );
    let stage = spawn_node(&mut scene, SceneNode::new("stage"));
    let speaker = spawn_node(
        &mut scene,
        SceneNode::new("speaker").with_payload(NodePayload::Audio(
            AudioSource::new("ambience.ogg", Vec3::new(2.0, 0.5, 2.0))
                .with_direction(Vec3::new(0.0, 0.0, -1.0)),
        )),
    );
    let spawn = spawn_node(
        &mut scene,
        SceneNode::new("spawn").with_payload(NodePayload::Presentable(Presentable::new(
            "player start",
            spawn_location(),
        ))),
    );

    let add_light = |scene: &mut Scene, owner: NodeId, light: Light| {
        scene.add_light(owner, light).unwrap_or_else(|err| {
            log::error!("Demo scene: {err}");
            LightId::next()
        })
    };
    let point = add_light(&mut scene, lamp, Light::point("bulb", point_position(), 8.0));
    let spot = add_light(
        &mut scene,
        stage,
        Light::spot("stage spot", Vec3::new(-4.0, 5.0, 0.0), spot_direction(), 12.0),
    );
    let sun = add_light(
        &mut scene,
        root,
        Light::directional("sun", sun_direction()).with_color([1.0, 0.95, 0.8]),
    );
    add_light(&mut scene, root, Light::ambient("fill"));

    DemoScene {
        scene,
        lamp,
        point,
        spot,
        sun,
        speaker,
        spawn,
    }
}

/// One scripted user action.
#[derive(Debug)]
pub enum Step {
    Execute(Box<dyn Operation<Scene>>),
    Undo,
    Redo,
    Save,
    /// Re-creates gizmo wrappers on the render thread.
    RebuildOverlay,
}

/// The edit sequence the demo session plays.
pub fn script(demo: &DemoScene) -> Vec<Step> {
    let root = demo.scene.root();
    let spawn_start = Transform::from_translation(spawn_location());
    let drag = |x: f32| spawn_start.with_translation(spawn_location() + Vec3::new(x, 0.0, 0.0));
    let turned: Quat = quat_from_rotation_y(std::f32::consts::FRAC_PI_4);

    vec![
        Step::Execute(Box::new(scene_ops::light_position(
            demo.point,
            Vec3::new(1.0, 2.0, 3.0),
            point_position(),
        ))),
        Step::Execute(Box::new(scene_ops::light_direction(
            demo.spot,
            Vec3::new(0.0, -1.0, 1.0),
            spot_direction(),
        ))),
        Step::Execute(Box::new(scene_ops::light_direction(
            demo.sun,
            Vec3::new(0.0, -1.0, 0.0),
            sun_direction(),
        ))),
        Step::Execute(Box::new(scene_ops::node_name(
            demo.speaker,
            "speaker (loop)".into(),
            "speaker".into(),
        ))),
        Step::Execute(Box::new(EnableControls::new(demo.lamp, false))),
        Step::Execute(Box::new(AddControl::new(demo.lamp, Control::new("sway")))),
        Step::Execute(Box::new(AddChild::new(
            root,
            SceneNode::new("crate").with_payload(NodePayload::Geometry {
                mesh: "crate.glb".into(),
            }),
        ))),
        Step::RebuildOverlay,
        // A gizmo drag arrives as several edits that collapse into one step.
        Step::Execute(Box::new(scene_ops::presentable_transform(
            demo.spawn,
            drag(0.5),
            spawn_start,
        ))),
        Step::Execute(Box::new(scene_ops::presentable_transform(
            demo.spawn,
            drag(1.0),
            drag(0.5),
        ))),
        Step::Execute(Box::new(scene_ops::presentable_transform(
            demo.spawn,
            drag(1.5),
            drag(1.0),
        ))),
        Step::Undo,
        Step::Undo,
        Step::Redo,
        Step::Save,
        Step::Execute(Box::new(scene_ops::presentable_rotation(
            demo.spawn,
            turned,
            Quat::identity(),
        ))),
    ]
}
