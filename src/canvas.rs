use egui::{
    vec2, Align2, Color32, Context, FontId, Painter, Pos2, Rect, Response, Sense, Shape, Stroke, Ui,
};

use crate::region::Region;
use crate::state::{DragState, EditorState, SelectionMode};
use crate::theme::AppTheme;

/// Draws the backdrop and every region overlay, then routes pointer input
/// into the editor's gesture machine. All region geometry is authored in
/// image space; only the final draw calls go through the viewport transform.
pub fn show_canvas(ui: &mut Ui, ctx: &Context, state: &mut EditorState, theme: &AppTheme) {
    if state.image.is_none() {
        empty_canvas(ui, theme);
        return;
    }

    let (texture_id, image_size) = {
        let image = state.image.as_mut().expect("image must exist");
        image.ensure_texture(ctx);
        (
            image.texture.as_ref().expect("texture is missing").id(),
            image.size_vec2(),
        )
    };

    let available = ui.available_size();
    let (canvas_rect, response) = ui.allocate_exact_size(available, Sense::click_and_drag());

    // Anchor the transform so the image sits centered at zero pan. The
    // origin depends on zoom but never on pan, keeping the pan offset a pure
    // screen-space translation.
    let scaled = image_size * state.viewport.zoom;
    state.viewport.origin = Pos2::new(
        canvas_rect.center().x - scaled.x * 0.5,
        canvas_rect.center().y - scaled.y * 0.5,
    );
    let image_rect = Rect::from_min_size(state.viewport.origin + state.viewport.pan, scaled);

    let painter = ui.painter_at(canvas_rect);
    painter.rect_filled(canvas_rect, 0.0, theme.surfaces.canvas_bg);

    let image_card = image_rect.expand(10.0);
    painter.rect_filled(
        image_card,
        12.0,
        Color32::from_rgba_unmultiplied(24, 28, 35, 190),
    );
    painter.rect_stroke(image_card, 12.0, Stroke::new(1.0, theme.surfaces.stroke_soft));

    painter.image(
        texture_id,
        image_rect,
        Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
        Color32::WHITE,
    );

    draw_regions(&painter, state, theme);
    draw_draft(&painter, state, theme);
    draw_handles(&painter, state, theme);

    handle_pointer_interaction(ctx, state, &response, image_rect);
}

fn empty_canvas(ui: &mut Ui, theme: &AppTheme) {
    let (rect, _) = ui.allocate_exact_size(ui.available_size(), Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 16.0, theme.surfaces.canvas_bg);
    painter.rect_stroke(rect, 16.0, Stroke::new(1.0, theme.surfaces.stroke_soft));
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        "Open an image (Cmd+O) or paste one (Cmd+V)",
        FontId::proportional(18.0),
        theme.text.secondary,
    );
}

fn draw_regions(painter: &Painter, state: &EditorState, theme: &AppTheme) {
    for (index, region) in state.regions.iter().enumerate() {
        let selected = state.selection == Some(region.id);
        let screen = screen_rect(state, region);

        let (stroke_color, fill, badge) = if selected {
            (
                theme.markers.selected_stroke,
                theme.markers.selected_fill,
                theme.markers.label_bg_selected,
            )
        } else {
            (
                theme.markers.region_stroke,
                theme.markers.region_fill,
                theme.markers.label_bg,
            )
        };

        painter.rect_filled(screen, 0.0, fill);
        painter.rect_stroke(
            screen,
            0.0,
            Stroke::new(if selected { 3.0 } else { 2.0 }, stroke_color),
        );

        draw_label(painter, theme, screen.center(), &format!("{}", index + 1), badge);
    }
}

fn draw_label(painter: &Painter, theme: &AppTheme, center: Pos2, label: &str, badge: Color32) {
    let galley = painter.layout_no_wrap(
        label.to_owned(),
        FontId::proportional(12.0),
        theme.markers.label_text,
    );
    let badge_rect = Rect::from_center_size(center, galley.size() + vec2(8.0, 4.0));
    painter.rect_filled(badge_rect, 4.0, badge);
    painter.galley(
        center - galley.size() * 0.5,
        galley,
        theme.markers.label_text,
    );
}

fn draw_draft(painter: &Painter, state: &EditorState, theme: &AppTheme) {
    let Some(DragState::Draw { draft }) = state.drag.as_ref() else {
        return;
    };

    // The raw draft may be inverted mid-drag; from_two_pos lets the rubber
    // band flip around its anchor naturally.
    let screen = Rect::from_two_pos(
        state.viewport.to_screen(draft.min()),
        state.viewport.to_screen(draft.max()),
    );

    painter.rect_filled(screen, 0.0, theme.markers.draft_fill);
    let stroke = Stroke::new(2.0, theme.markers.draft_stroke);
    for [a, b] in rect_edges(screen) {
        painter.extend(Shape::dashed_line(&[a, b], stroke, 5.0, 5.0));
    }
}

fn draw_handles(painter: &Painter, state: &EditorState, theme: &AppTheme) {
    if state.mode != SelectionMode::Edit {
        return;
    }
    let Some(region) = state.selected_region() else {
        return;
    };

    for (_, point) in region.handles() {
        let screen = state.viewport.to_screen(point);
        painter.circle_filled(screen, 4.5, theme.markers.handle_fill);
        painter.circle_stroke(screen, 4.5, Stroke::new(1.0, theme.markers.handle_stroke));
    }
}

fn handle_pointer_interaction(
    ctx: &Context,
    state: &mut EditorState,
    response: &Response,
    image_rect: Rect,
) {
    if !response.hovered() && !response.dragged() && !response.clicked() {
        return;
    }

    let pointer = ctx.input(|input| input.pointer.clone());
    let Some(pointer_pos) = pointer.interact_pos() else {
        return;
    };

    // Gestures that mutate regions must start inside the image; panning and
    // an already-running drag may roam the whole canvas.
    if !image_rect.contains(pointer_pos)
        && state.mode != SelectionMode::Move
        && state.drag.is_none()
    {
        return;
    }

    if response.drag_started() {
        state.pointer_down(pointer_pos);
    }
    if response.dragged() {
        state.pointer_move(pointer_pos);
    }
    if response.drag_stopped() {
        state.pointer_up(pointer_pos);
    }
    if response.clicked() {
        state.pointer_down(pointer_pos);
        state.pointer_up(pointer_pos);
    }
}

fn screen_rect(state: &EditorState, region: &Region) -> Rect {
    let norm = region.normalized();
    Rect::from_min_max(
        state.viewport.to_screen(norm.min()),
        state.viewport.to_screen(norm.max()),
    )
}

fn rect_edges(rect: Rect) -> [[Pos2; 2]; 4] {
    [
        [rect.left_top(), rect.right_top()],
        [rect.right_top(), rect.right_bottom()],
        [rect.right_bottom(), rect.left_bottom()],
        [rect.left_bottom(), rect.left_top()],
    ]
}
