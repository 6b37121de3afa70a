// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshzip Contributors

//! Gathering the two meshes of a pair into one
//!
//! Clipping operates on a single mesh, so finish starts by absorbing the
//! second scan's mesh into the first, re-expressed in the first scan's
//! local frame. Every handle recorded in the arena is remapped into the
//! unified id space at the same time.

use super::cuts::CutArena;
use crate::error::ZipperError;
use crate::scan::Scan;
use anyhow::Result;

pub(super) fn gather_scans(
    sc1: &mut Scan,
    sc2: &mut Scan,
    level: usize,
    arena: &mut CutArena,
) -> Result<()> {
    let x1 = sc1.xform;
    let x2 = sc2.xform;
    let mut m2 = sc2
        .take_mesh(level)
        .ok_or(ZipperError::MissingLevel(level))?;
    let m1 = sc1.mesh_mut(level)?;

    let (voff, toff) = m1.absorb(
        &mut m2,
        |p| x1.to_local_point(&x2.to_world_point(p)),
        |n| x1.to_local_normal(&x2.to_world_normal(n)),
    );
    // hand the drained shell back so the scan keeps a mesh at this level
    sc2.set_mesh(level, m2);

    arena.remap_b(voff, toff);
    Ok(())
}
