/* Set the gid_map of a process in a new user namespace.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 * http://www.apache.org/licenses/LICENSE-2.0
 * There is NO WARRANTY.
 *
 *     newgidmap PID GID LOWERGID COUNT [GID LOWERGID COUNT]...
 *
 * writes one line "GID LOWERGID COUNT" per triplet to
 * /proc/PID/gid_map, in a single write.  Each LOWERGID..LOWERGID+COUNT
 * range must lie inside one of the caller's /etc/subgid entries, or
 * be exactly the caller's own real gid with COUNT 1.  If any triplet
 * fails that test nothing is written at all.
 *
 * PID must belong to the caller (same real uid and gid).  Setting
 * GRANT_AUX_GROUP_SUBIDS in /etc/login.defs lets the caller's real
 * gid be a supplementary group rather than their primary one.
 *
 * Unless at least one triplet came from /etc/subgid, the target's
 * /proc/PID/setgroups is set to "deny" before the map is written, so
 * a caller that only mapped its own gid cannot use setgroups(2) to
 * drop groups it was denied by.  Kernels without the setgroups file
 * get a warning and are otherwise left alone.
 *
 * This program is to be installed setuid root (or with CAP_SETGID).
 */

fn main() {
    newidmap::main_for(newidmap::MapKind::Gid)
}
