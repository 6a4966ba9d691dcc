//! Sprite sheets drawn in code at startup.
//!
//! The sheets follow the same frame grids as [`Animation::bomber`] and
//! [`Animation::bomb`], which pick the visible frame out of them.

use bevy::{
    asset::RenderAssetUsages,
    prelude::*,
    render::render_resource::{Extent3d, TextureDimension, TextureFormat},
};

use super::animation::{
    Animation, BOMB_FRAME_SIZE, BOMB_SHEET_SIZE, BOMBER_FRAME_SIZE, BOMBER_SHEET_SIZE,
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, build_sprite_sheets);
}

/// Handles to the generated sheets.
#[derive(Resource, Debug, Clone)]
pub struct SpriteSheets {
    pub bomber: Handle<Image>,
    pub bomb: Handle<Image>,
}

impl SpriteSheets {
    /// A sprite showing the first frame of the avatar sheet.
    pub fn bomber_sprite(&self) -> Sprite {
        Sprite {
            image: self.bomber.clone(),
            rect: Some(Animation::bomber().source_rect().as_rect()),
            ..default()
        }
    }

    pub fn bomb_sprite(&self) -> Sprite {
        Sprite {
            image: self.bomb.clone(),
            rect: Some(Animation::bomb().source_rect().as_rect()),
            ..default()
        }
    }
}

type Rgba = [u8; 4];

const SUIT: Rgba = [235, 235, 240, 255];
const SUIT_SHADE: Rgba = [170, 170, 190, 255];
const HELMET: Rgba = [240, 190, 40, 255];
const VISOR: Rgba = [40, 40, 60, 255];
const EYE: Rgba = [250, 250, 255, 255];
const BOOT: Rgba = [90, 60, 160, 255];
const SHELL: Rgba = [35, 35, 45, 255];
const SHINE: Rgba = [110, 110, 130, 255];
const FUSE: Rgba = [150, 110, 70, 255];
const SPARK: Rgba = [255, 200, 60, 255];

/// A plain RGBA8 canvas.
struct Canvas {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width * height * 4) as usize],
        }
    }

    fn put(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let i = ((y as u32 * self.width + x as u32) * 4) as usize;
        self.data[i..i + 4].copy_from_slice(&color);
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba) {
        for py in y..y + height {
            for px in x..x + width {
                self.put(px, py, color);
            }
        }
    }

    fn fill_circle(&mut self, center: IVec2, radius: i32, color: Rgba) {
        for py in -radius..=radius {
            for px in -radius..=radius {
                if px * px + py * py <= radius * radius {
                    self.put(center.x + px, center.y + py, color);
                }
            }
        }
    }

    fn into_image(self) -> Image {
        Image::new(
            Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            self.data,
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::RENDER_WORLD,
        )
    }
}

/// Rows are Down, Up, Left, Right; columns step through a walk cycle.
fn draw_bomber_sheet() -> Canvas {
    let frame = BOMBER_FRAME_SIZE.as_ivec2();
    let sheet = BOMBER_SHEET_SIZE * BOMBER_FRAME_SIZE;
    let mut canvas = Canvas::new(sheet.x, sheet.y);

    for row in 0..BOMBER_SHEET_SIZE.y as i32 {
        for column in 0..BOMBER_SHEET_SIZE.x as i32 {
            let origin = IVec2::new(column * frame.x, row * frame.y);
            // Legs swing through the cycle, 0 is the standing pose.
            let stride = [0, 2, 4, 2, 0, -2, -4, -2, 0, 0][column as usize];
            let bob = if stride == 0 { 0 } else { 1 };

            canvas.fill_rect(origin.x + 14, origin.y + 28 + bob, 20, 22, SUIT);
            canvas.fill_rect(origin.x + 14, origin.y + 44 + bob, 20, 6, SUIT_SHADE);
            canvas.fill_rect(origin.x + 15, origin.y + 50 + stride.max(0), 7, 12, BOOT);
            canvas.fill_rect(origin.x + 26, origin.y + 50 + (-stride).max(0), 7, 12, BOOT);

            let head = IVec2::new(origin.x + 24, origin.y + 18 + bob);
            canvas.fill_circle(head, 13, HELMET);
            match row {
                // Facing the viewer.
                0 => {
                    canvas.fill_rect(head.x - 9, head.y - 3, 18, 9, VISOR);
                    canvas.fill_rect(head.x - 5, head.y, 3, 4, EYE);
                    canvas.fill_rect(head.x + 3, head.y, 3, 4, EYE);
                }
                // Back of the helmet.
                1 => canvas.fill_rect(head.x - 2, head.y - 12, 4, 6, SUIT_SHADE),
                2 => {
                    canvas.fill_rect(head.x - 13, head.y - 3, 12, 9, VISOR);
                    canvas.fill_rect(head.x - 9, head.y, 3, 4, EYE);
                }
                _ => {
                    canvas.fill_rect(head.x + 1, head.y - 3, 12, 9, VISOR);
                    canvas.fill_rect(head.x + 6, head.y, 3, 4, EYE);
                }
            }
        }
    }

    canvas
}

/// One frame per fuse length, burning down left to right.
fn draw_bomb_sheet() -> Canvas {
    let frame = BOMB_FRAME_SIZE.as_ivec2();
    let sheet = BOMB_SHEET_SIZE * BOMB_FRAME_SIZE;
    let mut canvas = Canvas::new(sheet.x, sheet.y);

    for column in 0..BOMB_SHEET_SIZE.x as i32 {
        let origin = IVec2::new(column * frame.x, 0);
        let center = IVec2::new(origin.x + 17, origin.y + 22);
        canvas.fill_circle(center, 13, SHELL);
        canvas.fill_circle(center + IVec2::new(-5, -5), 3, SHINE);

        let fuse = 9 - column * 2;
        canvas.fill_rect(center.x + 6, center.y - 12 - fuse, 2, fuse, FUSE);
        let spark = IVec2::new(center.x + 7, center.y - 13 - fuse);
        let radius = if column % 2 == 0 { 3 } else { 2 };
        canvas.fill_circle(spark, radius, SPARK);
    }

    canvas
}

fn build_sprite_sheets(mut commands: Commands, mut images: ResMut<Assets<Image>>) {
    let bomber = images.add(draw_bomber_sheet().into_image());
    let bomb = images.add(draw_bomb_sheet().into_image());

    commands.insert_resource(SpriteSheets { bomber, bomb });

    info!("Sprite sheets generated");
}
