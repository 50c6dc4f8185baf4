//! Starter program shipped with the window host
//!
//! What a compiled beginner project looks like: a name prompt at start, a
//! circle steered with the arrow keys, space to score, and a star to catch.

use playfield::{Engine, Task};
use std::cell::RefCell;
use std::rc::Rc;

const SPEED: f32 = 5.0;

#[derive(Debug)]
struct State {
    name: String,
    score: i64,
    x: f32,
    y: f32,
}

pub fn install(engine: &mut Engine) {
    let state = Rc::new(RefCell::new(State {
        name: String::new(),
        score: 0,
        x: 400.0,
        y: 300.0,
    }));

    let ctx = engine.context_mut();
    let player = ctx.create_figure("player.png");
    let star = ctx.create_figure("star.png");
    ctx.move_to(player, 375.0, 275.0);
    ctx.move_to(star, 120.0, 420.0);

    let s = Rc::clone(&state);
    engine.on_start(move |ctx| {
        let s = Rc::clone(&s);
        let name = ctx.ask("What's your name?");
        Ok(Task::after(name, move |_, name| {
            s.borrow_mut().name = name;
            Ok(())
        }))
    });

    let s = Rc::clone(&state);
    engine.on_frame(move |ctx, _dt| {
        let mut s = s.borrow_mut();
        ctx.draw_rect(0.0, 0.0, ctx.width() as f32, ctx.height() as f32, "#1a1a2e");

        if ctx.key_held("left") {
            s.x -= SPEED;
        }
        if ctx.key_held("right") {
            s.x += SPEED;
        }
        if ctx.key_held("up") {
            s.y -= SPEED;
        }
        if ctx.key_held("down") {
            s.y += SPEED;
        }
        ctx.draw_circle(s.x, s.y, 25.0, "#4ecca3");
        ctx.move_to(player, s.x - 25.0, s.y - 25.0);

        ctx.draw_rect(10.0, 10.0, 160.0, 35.0, "#16213e");
        ctx.draw_text(&format!("Score: {}", s.score), 20.0, 35.0, "#ffffff", 20.0);
        if !s.name.is_empty() {
            let greeting = format!("Hi {}! Use the arrow keys", s.name);
            ctx.draw_text(&greeting, 200.0, 35.0, "#e0e6ed", 14.0);
        }
        Ok(())
    });

    let s = Rc::clone(&state);
    engine.on_key("space", move |ctx| {
        s.borrow_mut().score += 1;
        ctx.play_sound("coin.wav");
        Ok(())
    });

    engine.on_key("escape", |ctx| {
        ctx.request_stop();
        Ok(())
    });

    let s = state;
    engine.on_collision(player, star, move |ctx| {
        s.borrow_mut().score += 10;
        let x = ctx.random(0, ctx.width() as i64 - 50);
        let y = ctx.random(60, ctx.height() as i64 - 50);
        ctx.move_to(star, x as f32, y as f32);
        ctx.play_sound("coin.wav");
        Ok(())
    });
}
